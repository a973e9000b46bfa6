//! Class file constant pool.

use super::ByteReader;
use crate::error::{AnalysisError, Result};

/// One constant pool slot. Only Utf8 and Class entries carry information
/// needed for reference extraction; everything else is measured and skipped.
#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    /// Placeholder for entries without relevance here, including the unused
    /// second slot of long and double constants.
    Other,
}

/// The fully read constant pool of one class file. Indices are 1-based as
/// in the class file format.
#[derive(Debug)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Reads `constant_pool_count` and all entries from the stream.
    pub(crate) fn read(reader: &mut ByteReader) -> Result<Self> {
        let count = reader.read_u16()? as usize;
        let mut entries = vec![Constant::Other]; // slot 0 is unused
        while entries.len() < count {
            let tag = reader.read_u8()?;
            match tag {
                1 => {
                    let length = reader.read_u16()? as usize;
                    let bytes = reader.take(length)?;
                    entries.push(Constant::Utf8(String::from_utf8_lossy(bytes).into_owned()));
                }
                7 => {
                    let name_index = reader.read_u16()?;
                    entries.push(Constant::Class { name_index });
                }
                8 | 16 | 19 | 20 => {
                    // String, MethodType, Module, Package
                    reader.skip(2)?;
                    entries.push(Constant::Other);
                }
                15 => {
                    // MethodHandle
                    reader.skip(3)?;
                    entries.push(Constant::Other);
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    // Integer, Float, member refs, NameAndType, Dynamic
                    reader.skip(4)?;
                    entries.push(Constant::Other);
                }
                5 | 6 => {
                    // Long and Double take two slots
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    entries.push(Constant::Other);
                }
                unknown => {
                    return Err(AnalysisError::bad_class_file(format!(
                        "unknown constant pool tag {unknown}"
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// Returns the Utf8 value at the given index.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.entries.get(index as usize) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(AnalysisError::bad_class_file(format!(
                "constant {index} is not a Utf8 entry"
            ))),
        }
    }

    /// Resolves the Class entry at the given index to its name string.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.entries.get(index as usize) {
            Some(Constant::Class { name_index }) => self.utf8(*name_index),
            _ => Err(AnalysisError::bad_class_file(format!(
                "constant {index} is not a Class entry"
            ))),
        }
    }

    /// Resolves every Class entry in the pool.
    pub fn class_names(&self) -> Result<Vec<&str>> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Constant::Class { name_index } => Some(self.utf8(*name_index)),
                _ => None,
            })
            .collect()
    }
}
