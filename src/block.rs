use crate::record::{invalid_number, to_f64};
use crate::{Charset, Error, ErrorKind, Record};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// A planar coordinate in the support's projection, in meters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize))]
pub struct Coord {
    pub east: f64,
    pub north: f64,
}

/// A composed reference to a descriptor, e.g. a schema or quality entry
///
/// Pointer fields carry their target as a sequence of parts (lot, subset,
/// identifier). The parts are kept in on-file order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize))]
pub struct Reference<'a>(Vec<Cow<'a, str>>);

impl<'a> Reference<'a> {
    fn from_record(record: &Record<'a>, charset: Charset) -> Reference<'a> {
        Reference(record.values().iter().map(|v| charset.decode(v)).collect())
    }

    /// The ordered parts of the reference
    pub fn parts(&self) -> &[Cow<'a, str>] {
        &self.0
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// The standard vector block kinds, keyed by their `RTY` type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "derive", derive(serde::Serialize))]
pub enum BlockKind {
    /// `PNO`: a point primitive
    Node,
    /// `PAR`: a line primitive
    Arc,
    /// `PFE`: an area primitive
    Face,
    /// `FEA`: an attribute-bearing feature
    Object,
    /// `LNK`: a relation between primitives and features
    Relation,
}

impl BlockKind {
    /// Resolves a standard type code to its kind
    ///
    /// ```
    /// use edigeo::BlockKind;
    ///
    /// assert_eq!(BlockKind::from_code("PNO"), Some(BlockKind::Node));
    /// assert_eq!(BlockKind::from_code("LNK"), Some(BlockKind::Relation));
    /// assert_eq!(BlockKind::from_code("XYZ"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<BlockKind> {
        match code {
            "PNO" => Some(BlockKind::Node),
            "PAR" => Some(BlockKind::Arc),
            "PFE" => Some(BlockKind::Face),
            "FEA" => Some(BlockKind::Object),
            "LNK" => Some(BlockKind::Relation),
            _ => None,
        }
    }

    /// The standard type code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            BlockKind::Node => "PNO",
            BlockKind::Arc => "PAR",
            BlockKind::Face => "PFE",
            BlockKind::Object => "FEA",
            BlockKind::Relation => "LNK",
        }
    }
}

/// Maps `RTY` type codes to block kinds
///
/// The reader asks its factory once per `RTY` record. Returning `None`
/// rejects the code and fails the parse with
/// [`ErrorKind::UnknownBlockType`], so a factory doubles as a whitelist of
/// the block types a caller is prepared to handle.
pub trait BlockFactory {
    /// Resolve a type code into the kind of block to open
    fn resolve(&self, code: &str) -> Option<BlockKind>;
}

/// The standard code table: `PNO`, `PAR`, `PFE`, `FEA`, and `LNK`
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFactory;

impl BlockFactory for StandardFactory {
    fn resolve(&self, code: &str) -> Option<BlockKind> {
        BlockKind::from_code(code)
    }
}

impl BlockFactory for HashMap<String, BlockKind> {
    fn resolve(&self, code: &str) -> Option<BlockKind> {
        self.get(code).copied()
    }
}

impl<T: BlockFactory + ?Sized> BlockFactory for &'_ T {
    fn resolve(&self, code: &str) -> Option<BlockKind> {
        (**self).resolve(code)
    }
}

/// The kind-specific fields of a block
///
/// Count fields and type codes read as 0 until their record sets them.
/// Bounding and position coordinates stay `None` when their record is
/// absent or empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize))]
pub enum BlockData<'a> {
    /// A point primitive: `TYP` type code, `COR` position
    Node {
        node_type: i64,
        coordinate: Option<Coord>,
    },
    /// A line primitive: `CM1`/`CM2` bounds, `TYP` type code, `PTC`
    /// declared point count, one `COR` per point
    Arc {
        min: Option<Coord>,
        max: Option<Coord>,
        arc_type: i64,
        point_count: i64,
        points: Vec<Coord>,
    },
    /// An area primitive: `CM1`/`CM2` bounds
    Face {
        min: Option<Coord>,
        max: Option<Coord>,
    },
    /// A feature: `CM1`/`CM2` bounds, `REF` positioning primitive
    Object {
        min: Option<Coord>,
        max: Option<Coord>,
        point_ref: Option<Reference<'a>>,
    },
    /// A relation: `FTC` declared element count, one `FTP` per element
    Relation {
        element_count: i64,
        elements: Vec<Reference<'a>>,
    },
}

impl<'a> BlockData<'a> {
    fn for_kind(kind: BlockKind) -> BlockData<'a> {
        match kind {
            BlockKind::Node => BlockData::Node {
                node_type: 0,
                coordinate: None,
            },
            BlockKind::Arc => BlockData::Arc {
                min: None,
                max: None,
                arc_type: 0,
                point_count: 0,
                points: Vec::new(),
            },
            BlockKind::Face => BlockData::Face {
                min: None,
                max: None,
            },
            BlockKind::Object => BlockData::Object {
                min: None,
                max: None,
                point_ref: None,
            },
            BlockKind::Relation => BlockData::Relation {
                element_count: 0,
                elements: Vec::new(),
            },
        }
    }
}

/// A typed aggregate of the records between one `RTY` and the next
///
/// Every block shares the identification and attribute records; the fields
/// behind the `RTY` discriminator live in [`BlockData`]. Blocks borrow the
/// buffer they were parsed from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize))]
pub struct Block<'a> {
    code: Cow<'a, str>,
    identifier: Option<Cow<'a, str>>,
    schema_ref: Option<Reference<'a>>,
    attribute_count: i64,
    attribute_refs: Vec<Reference<'a>>,
    attribute_values: Vec<Cow<'a, str>>,
    quality_count: i64,
    quality_refs: Vec<Reference<'a>>,
    data: BlockData<'a>,
}

impl<'a> Block<'a> {
    /// Creates an empty block of the given kind
    ///
    /// `code` is the type code the block was opened with, usually the
    /// kind's standard code but a custom [`BlockFactory`] may map others.
    ///
    /// # Panics
    ///
    /// Panics when `code` is empty. A block always comes from an `RTY`
    /// record that named it, so an empty code is a programming error in
    /// the caller.
    pub fn new<C: Into<Cow<'a, str>>>(kind: BlockKind, code: C) -> Block<'a> {
        let code = code.into();
        assert!(!code.is_empty(), "block type code must not be empty");
        Block {
            code,
            identifier: None,
            schema_ref: None,
            attribute_count: 0,
            attribute_refs: Vec::new(),
            attribute_values: Vec::new(),
            quality_count: 0,
            quality_refs: Vec::new(),
            data: BlockData::for_kind(kind),
        }
    }

    /// The type code the block was opened with
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The kind of this block
    pub fn kind(&self) -> BlockKind {
        match self.data {
            BlockData::Node { .. } => BlockKind::Node,
            BlockData::Arc { .. } => BlockKind::Arc,
            BlockData::Face { .. } => BlockKind::Face,
            BlockData::Object { .. } => BlockKind::Object,
            BlockData::Relation { .. } => BlockKind::Relation,
        }
    }

    /// The identifier set by the block's `RID` record
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// The schema descriptor this block instantiates (`SCP`)
    pub fn schema_ref(&self) -> Option<&Reference<'a>> {
        self.schema_ref.as_ref()
    }

    /// The declared attribute count (`ATC`)
    pub fn attribute_count(&self) -> i64 {
        self.attribute_count
    }

    /// Attribute descriptor references, one per `ATP` record
    pub fn attribute_refs(&self) -> &[Reference<'a>] {
        &self.attribute_refs
    }

    /// Attribute values, one per `ATV` record; a null value reads as `""`
    pub fn attribute_values(&self) -> &[Cow<'a, str>] {
        &self.attribute_values
    }

    /// The declared quality count (`QAC`)
    pub fn quality_count(&self) -> i64 {
        self.quality_count
    }

    /// Quality descriptor references, one per `QAP` record
    pub fn quality_refs(&self) -> &[Reference<'a>] {
        &self.quality_refs
    }

    /// The kind-specific fields
    pub fn data(&self) -> &BlockData<'a> {
        &self.data
    }

    /// Routes one record into the block
    ///
    /// A record name neither the shared group nor the kind recognizes is a
    /// hard error; nothing is skipped silently.
    pub(crate) fn process_record(
        &mut self,
        record: &Record<'a>,
        charset: Charset,
    ) -> Result<(), Error> {
        match record.name() {
            // a later RID wins over an earlier one
            "RID" => self.identifier = record.first_str_logged(charset, "identifier"),
            "SCP" => self.schema_ref = Some(Reference::from_record(record, charset)),
            "ATC" => self.attribute_count = record.first_i64()?,
            "ATP" => self.attribute_refs.push(Reference::from_record(record, charset)),
            "ATV" => self
                .attribute_values
                .push(record.first_str(charset).unwrap_or(Cow::Borrowed(""))),
            "QAC" => self.quality_count = record.first_i64()?,
            "QAP" => self.quality_refs.push(Reference::from_record(record, charset)),
            // free text annotation, accepted but not retained
            "TEX" => {}
            name => match (&mut self.data, name) {
                (BlockData::Node { node_type, .. }, "TYP") => *node_type = record.first_i64()?,
                (BlockData::Node { coordinate, .. }, "COR") => *coordinate = coord(record)?,
                (BlockData::Arc { min, .. }, "CM1") => *min = coord(record)?,
                (BlockData::Arc { max, .. }, "CM2") => *max = coord(record)?,
                (BlockData::Arc { arc_type, .. }, "TYP") => *arc_type = record.first_i64()?,
                (BlockData::Arc { point_count, .. }, "PTC") => {
                    *point_count = record.first_i64()?
                }
                (BlockData::Arc { points, .. }, "COR") => {
                    if let Some(point) = coord(record)? {
                        points.push(point);
                    }
                }
                (BlockData::Face { min, .. }, "CM1") => *min = coord(record)?,
                (BlockData::Face { max, .. }, "CM2") => *max = coord(record)?,
                (BlockData::Object { min, .. }, "CM1") => *min = coord(record)?,
                (BlockData::Object { max, .. }, "CM2") => *max = coord(record)?,
                (BlockData::Object { point_ref, .. }, "REF") => {
                    *point_ref = Some(Reference::from_record(record, charset))
                }
                (BlockData::Relation { element_count, .. }, "FTC") => {
                    *element_count = record.first_i64()?
                }
                (BlockData::Relation { elements, .. }, "FTP") => {
                    elements.push(Reference::from_record(record, charset))
                }
                _ => {
                    return Err(Error::new(ErrorKind::UnexpectedRecord {
                        block: self.code.clone().into_owned(),
                        line: record.line(),
                        record: record.to_string(),
                    }))
                }
            },
        }

        Ok(())
    }
}

/// Reads a two part coordinate field; an empty record means the
/// coordinate is absent
fn coord(record: &Record) -> Result<Option<Coord>, Error> {
    match record.values() {
        [] => Ok(None),
        [east, north, ..] => Ok(Some(Coord {
            east: to_f64(east).ok_or_else(|| invalid_number(east))?,
            north: to_f64(north).ok_or_else(|| invalid_number(north))?,
        })),
        [_] => Err(Error::new(ErrorKind::MalformedRecord {
            line: record.line(),
            raw: record.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply<'a>(block: &mut Block<'a>, line: &'a [u8]) -> Result<(), Error> {
        let record = Record::parse(line, 1).unwrap();
        block.process_record(&record, Charset::Latin1)
    }

    #[test]
    fn standard_factory_resolves_codes() {
        let factory = StandardFactory;
        assert_eq!(factory.resolve("PNO"), Some(BlockKind::Node));
        assert_eq!(factory.resolve("PAR"), Some(BlockKind::Arc));
        assert_eq!(factory.resolve("PFE"), Some(BlockKind::Face));
        assert_eq!(factory.resolve("FEA"), Some(BlockKind::Object));
        assert_eq!(factory.resolve("LNK"), Some(BlockKind::Relation));
        assert_eq!(factory.resolve("GTS"), None);
        assert_eq!(factory.resolve(""), None);
    }

    #[test]
    fn hashmap_factory_resolves_codes() {
        let mut table = HashMap::new();
        table.insert(String::from("PT1"), BlockKind::Node);
        assert_eq!(table.resolve("PT1"), Some(BlockKind::Node));
        assert_eq!(table.resolve("PNO"), None);
        assert_eq!((&table).resolve("PT1"), Some(BlockKind::Node));
    }

    #[test]
    fn block_kind_codes_round_trip() {
        for kind in [
            BlockKind::Node,
            BlockKind::Arc,
            BlockKind::Face,
            BlockKind::Object,
            BlockKind::Relation,
        ] {
            assert_eq!(BlockKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    #[should_panic(expected = "block type code must not be empty")]
    fn block_new_rejects_empty_code() {
        let _ = Block::new(BlockKind::Node, "");
    }

    #[test]
    fn block_rid_sets_identifier_and_last_wins() {
        let mut block = Block::new(BlockKind::Node, "PNO");
        assert_eq!(block.identifier(), None);

        apply(&mut block, b"RIDSA08:PNO00001").unwrap();
        assert_eq!(block.identifier(), Some("PNO00001"));

        apply(&mut block, b"RIDSA08:PNO00002").unwrap();
        assert_eq!(block.identifier(), Some("PNO00002"));
    }

    #[test]
    fn node_block_records() {
        let mut block = Block::new(BlockKind::Node, "PNO");
        apply(&mut block, b"TYPSN01:1").unwrap();
        apply(&mut block, b"CORCC21:+875297.17;+6547102.59").unwrap();

        assert_eq!(block.kind(), BlockKind::Node);
        assert_eq!(
            block.data(),
            &BlockData::Node {
                node_type: 1,
                coordinate: Some(Coord {
                    east: 875297.17,
                    north: 6547102.59
                }),
            }
        );
    }

    #[test]
    fn arc_block_records() {
        let mut block = Block::new(BlockKind::Arc, "PAR");
        apply(&mut block, b"CM1CC20:+875000.00;+6547000.00").unwrap();
        apply(&mut block, b"CM2CC20:+875300.00;+6547200.00").unwrap();
        apply(&mut block, b"TYPSN01:1").unwrap();
        apply(&mut block, b"PTCSN01:2").unwrap();
        apply(&mut block, b"CORCC20:+875000.00;+6547000.00").unwrap();
        apply(&mut block, b"CORCC20:+875300.00;+6547200.00").unwrap();

        match block.data() {
            BlockData::Arc {
                min,
                max,
                arc_type,
                point_count,
                points,
            } => {
                assert!(min.is_some() && max.is_some());
                assert_eq!(*arc_type, 1);
                assert_eq!(*point_count, 2);
                assert_eq!(points.len(), 2);
                assert_eq!(
                    points[1],
                    Coord {
                        east: 875300.0,
                        north: 6547200.0
                    }
                );
            }
            other => panic!("expected an arc, got {:?}", other),
        }
    }

    #[test]
    fn face_block_records() {
        let mut block = Block::new(BlockKind::Face, "PFE");
        apply(&mut block, b"CM1CC20:+875000.00;+6547000.00").unwrap();
        apply(&mut block, b"CM2CC20:+875300.00;+6547200.00").unwrap();

        match block.data() {
            BlockData::Face { min, max } => {
                assert_eq!(
                    *min,
                    Some(Coord {
                        east: 875000.0,
                        north: 6547000.0
                    })
                );
                assert_eq!(
                    *max,
                    Some(Coord {
                        east: 875300.0,
                        north: 6547200.0
                    })
                );
            }
            other => panic!("expected a face, got {:?}", other),
        }
    }

    #[test]
    fn object_block_records() {
        let mut block = Block::new(BlockKind::Object, "FEA");
        apply(&mut block, b"CM1CC20:+875000.00;+6547000.00").unwrap();
        apply(&mut block, b"CM2CC20:+875300.00;+6547200.00").unwrap();
        apply(&mut block, b"REFCP18:FU3;SeTOP;PNO00001").unwrap();

        match block.data() {
            BlockData::Object { point_ref, .. } => {
                let reference = point_ref.as_ref().unwrap();
                assert_eq!(reference.parts(), &["FU3", "SeTOP", "PNO00001"]);
                assert_eq!(reference.to_string(), "FU3;SeTOP;PNO00001");
            }
            other => panic!("expected an object, got {:?}", other),
        }
    }

    #[test]
    fn relation_block_records() {
        let mut block = Block::new(BlockKind::Relation, "LNK");
        apply(&mut block, b"FTCSN01:2").unwrap();
        apply(&mut block, b"FTPCP18:FU3;SeTOP;FEA00001").unwrap();
        apply(&mut block, b"FTPCP18:FU3;SeTOP;PFE00012").unwrap();

        match block.data() {
            BlockData::Relation {
                element_count,
                elements,
            } => {
                assert_eq!(*element_count, 2);
                assert_eq!(elements.len(), 2);
                assert_eq!(elements[1].to_string(), "FU3;SeTOP;PFE00012");
            }
            other => panic!("expected a relation, got {:?}", other),
        }
    }

    #[test]
    fn shared_records_apply_to_every_kind() {
        for kind in [
            BlockKind::Node,
            BlockKind::Arc,
            BlockKind::Face,
            BlockKind::Object,
            BlockKind::Relation,
        ] {
            let mut block = Block::new(kind, kind.code());
            apply(&mut block, b"SCPCP26:FU3;SeSD;ID_S_OBJ_E_BATIMENT").unwrap();
            apply(&mut block, b"ATCSN01:1").unwrap();
            apply(&mut block, b"ATPCP20:FU3;SeSD;ID_S_ATT_DUR").unwrap();
            apply(&mut block, b"ATVSA09:Dur\xe9").unwrap();
            apply(&mut block, b"QACSN01:1").unwrap();
            apply(&mut block, b"QAPCP20:FU3;SeQL;Actualite").unwrap();
            apply(&mut block, b"TEXSA05:notes").unwrap();

            assert_eq!(
                block.schema_ref().unwrap().to_string(),
                "FU3;SeSD;ID_S_OBJ_E_BATIMENT"
            );
            assert_eq!(block.attribute_count(), 1);
            assert_eq!(block.attribute_refs().len(), 1);
            assert_eq!(block.attribute_values(), &["Duré"]);
            assert_eq!(block.quality_count(), 1);
            assert_eq!(block.quality_refs().len(), 1);
        }
    }

    #[test]
    fn empty_attribute_value_reads_as_empty_string() {
        let mut block = Block::new(BlockKind::Object, "FEA");
        apply(&mut block, b"ATVSA00:").unwrap();
        assert_eq!(block.attribute_values(), &[""]);
    }

    #[test]
    fn unexpected_record_is_a_hard_error() {
        let mut block = Block::new(BlockKind::Face, "PFE");
        let err = apply(&mut block, b"CORCC20:+875000.00;+6547000.00").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedRecord { block, line: 1, .. } if block == "PFE"
        ));

        let mut block = Block::new(BlockKind::Node, "PNO");
        let err = apply(&mut block, b"FTCSN01:2").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnexpectedRecord { .. }));
    }

    #[test]
    fn empty_coordinate_record_means_absent() {
        let mut block = Block::new(BlockKind::Node, "PNO");
        apply(&mut block, b"CORCC00:").unwrap();
        assert_eq!(
            block.data(),
            &BlockData::Node {
                node_type: 0,
                coordinate: None
            }
        );
    }

    #[test]
    fn coordinate_faults() {
        let mut block = Block::new(BlockKind::Node, "PNO");

        let err = apply(&mut block, b"CORCC10:+875297.17").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedRecord { .. }));

        let err = apply(&mut block, b"CORCC21:+875297.17;north").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidNumber { value } if value == "north"
        ));
    }

    #[test]
    fn count_faults() {
        let mut block = Block::new(BlockKind::Arc, "PAR");
        let err = apply(&mut block, b"PTCSN03:two").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidNumber { .. }));
    }
}
