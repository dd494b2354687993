//! Print a one line summary of every block in an EDIGEO file
//!
//! Reads the files named on the command line (or stdin when none are
//! given). Useful for eyeballing what a delivery contains before wiring
//! up a real consumer.
//!
//! Here is some sample output:
//!
//! ```text
//! $ dump E000AB01.VEC
//! PNO PNO00001 node at (875297.17, 6547102.59)
//! PAR PAR00001 arc, 2 points
//! PFE PFE00012 face
//! FEA FEA00007 object, 3 attributes
//! LNK LNK00003 relation, 2 elements
//! 5 blocks (charset IRV)
//! ```

use edigeo::{BlockData, BlockReader};
use std::error;
use std::fs;
use std::io::{self, Read};

fn main() -> Result<(), Box<dyn error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        dump(&data)?;
    } else {
        for path in &args {
            let data = fs::read(path)?;
            dump(&data)?;
        }
    }

    Ok(())
}

fn dump(data: &[u8]) -> Result<(), Box<dyn error::Error>> {
    let mut reader = BlockReader::new(data);
    let mut count = 0usize;

    while let Some(block) = reader.next_block()? {
        count += 1;
        let detail = match block.data() {
            BlockData::Node {
                coordinate: Some(c),
                ..
            } => format!("node at ({}, {})", c.east, c.north),
            BlockData::Node {
                coordinate: None, ..
            } => String::from("node"),
            BlockData::Arc { points, .. } => format!("arc, {} points", points.len()),
            BlockData::Face { .. } => String::from("face"),
            BlockData::Object { .. } => {
                format!("object, {} attributes", block.attribute_values().len())
            }
            BlockData::Relation { elements, .. } => {
                format!("relation, {} elements", elements.len())
            }
        };

        println!(
            "{} {} {}",
            block.code(),
            block.identifier().unwrap_or("?"),
            detail
        );
    }

    println!("{} blocks (charset {})", count, reader.charset());
    Ok(())
}
