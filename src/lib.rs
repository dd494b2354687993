/*!

A fail-fast ingestion engine for [EDIGEO](https://fr.wikipedia.org/wiki/EDIG%C3%89O),
the exchange format used by the French cadastre and other geographic data
producers: flat text files of fixed-form line records, grouped into typed
blocks between a `BOM` header and an `EOM` footer.

## Features

- ✔ Validating: the mandatory `BOM` / `CSE` / `EOM` framing is checked on every file
- ✔ Lazy: blocks stream out of a pull-based reader one at a time
- ✔ Zero-copy: blocks borrow the input buffer and ASCII fields never allocate
- ✔ Fail-fast: the first structural fault stops the parse with a line-numbered error
- ✔ Extensible: a custom [BlockFactory] controls which block types a file may carry
- ✔ Exportable: optional serde support for handing parsed blocks to downstream tools

## Quick Start

```rust
use edigeo::{BlockData, BlockReader};

let data = b"BOMT 12:EDIGEO-VEC.
CSET 03:IRV
RTYSA03:PNO
RIDSA08:PNO00001
CORCC21:+875297.17;+6547102.59
EOMT 00:
";

let mut reader = BlockReader::new(data);
let node = reader.next_block().unwrap().unwrap();
assert_eq!(node.code(), "PNO");
assert_eq!(node.identifier(), Some("PNO00001"));

match node.data() {
    BlockData::Node { coordinate, .. } => {
        assert_eq!(coordinate.map(|c| c.east), Some(875297.17));
    }
    _ => unreachable!(),
}

assert!(reader.next_block().unwrap().is_none());
```

## Error Handling

Every fault is fatal to the parse of its file: the reader reports the error
once, with the 1-based line number where available, and yields nothing
further. There is no resynchronization, so a truncated or shuffled file can
never produce a partially believable result.

```rust
use edigeo::{parse, ErrorKind};

let err = parse(b"CSET 03:IRV\n").unwrap_err();
assert!(matches!(err.kind(), ErrorKind::UnexpectedFirstRecord { .. }));
assert_eq!(err.line(), Some(1));
```

## Custom Block Tables

The reader resolves each `RTY` type code through a [BlockFactory]. The
default [StandardFactory] accepts the standard vector codes; a map can
stand in to accept other code tables or to whitelist a subset.

```rust
use edigeo::{BlockKind, BlockReader};
use std::collections::HashMap;

let mut table = HashMap::new();
table.insert(String::from("PNO"), BlockKind::Node);

let data = b"BOMT 12:EDIGEO-VEC.
CSET 03:IRV
RTYSA03:PNO
EOMT 00:
";

let blocks: Vec<_> = BlockReader::with_factory(data, table)
    .collect::<Result<_, _>>()
    .unwrap();
assert_eq!(blocks.len(), 1);
```

*/

mod block;
mod charset;
mod date;
mod errors;
mod lexer;
mod reader;
mod record;

pub use self::block::*;
pub use self::charset::Charset;
pub use self::date::{Date, DateError};
pub use self::errors::{Error, ErrorKind};
pub use self::lexer::Lexer;
pub use self::reader::{parse, BlockReader};
pub use self::record::Record;
