//! Emit the blocks of EDIGEO files as JSON
//!
//! Reads the files named on the command line (or stdin when none are
//! given) and writes one JSON array of blocks per file:
//!
//! ```text
//! $ json E000AB01.VEC
//! [
//!   {
//!     "code": "PNO",
//!     "identifier": "PNO00001",
//!     ...
//!   }
//! ]
//! ```

use std::error;
use std::fs;
use std::io::{self, Read, Write};

fn main() -> Result<(), Box<dyn error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdout = io::stdout();
    let mut lock = stdout.lock();

    if args.is_empty() {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        emit(&data, &mut lock)?;
    } else {
        for path in &args {
            let data = fs::read(path)?;
            emit(&data, &mut lock)?;
        }
    }

    Ok(())
}

fn emit<W: Write>(data: &[u8], writer: &mut W) -> Result<(), Box<dyn error::Error>> {
    let blocks = edigeo::parse(data)?;
    serde_json::to_writer_pretty(&mut *writer, &blocks)?;
    writeln!(writer)?;
    Ok(())
}
