//! Bytecode reference extractor.
//!
//! Reads one class artifact only as far as needed to collect the symbolic
//! references: magic and versions, the constant pool, this/super class and
//! interfaces, then the descriptors of all fields and methods. Bodies and
//! attributes are skipped.

mod constant_pool;
mod descriptor;

pub use constant_pool::ConstantPool;
pub use descriptor::{class_constant_name, collect_descriptor_names};

use crate::error::{AnalysisError, Result};
use std::collections::BTreeSet;

const MAGIC: u32 = 0xCAFE_BABE;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

/// The extracted symbolic surface of one class artifact.
#[derive(Debug, Clone)]
pub struct ClassSummary {
    /// Fully qualified name of the class under analysis.
    pub class_name: String,
    /// Fully qualified names of all referenced classes, excluding the class
    /// itself and primitive types.
    pub references: BTreeSet<String>,
    /// True if the class declares `public static void main(String[])`.
    pub has_main: bool,
}

/// Parses one class byte stream into its defining name and reference set.
pub fn extract(bytes: &[u8]) -> Result<ClassSummary> {
    let mut reader = ByteReader::new(bytes);
    if reader.read_u32()? != MAGIC {
        return Err(AnalysisError::bad_class_file("missing CAFEBABE magic"));
    }
    reader.skip(4)?; // minor and major version

    let pool = ConstantPool::read(&mut reader)?;

    reader.skip(2)?; // access flags
    let this_class = reader.read_u16()?;
    let class_name = pool.class_name(this_class)?.replace('/', ".");
    reader.skip(2)?; // super class, already in the pool
    let interface_count = reader.read_u16()? as usize;
    reader.skip(2 * interface_count)?;

    let mut references = BTreeSet::new();
    for raw in pool.class_names()? {
        if let Some(name) = class_constant_name(raw) {
            references.insert(name);
        }
    }

    let mut has_main = false;
    let field_count = reader.read_u16()?;
    for _ in 0..field_count {
        reader.skip(4)?; // access flags, name index
        let descriptor = pool.utf8(reader.read_u16()?)?;
        collect_descriptor_names(descriptor, &mut references)?;
        skip_attributes(&mut reader)?;
    }

    let method_count = reader.read_u16()?;
    for _ in 0..method_count {
        let access = reader.read_u16()?;
        let name = pool.utf8(reader.read_u16()?)?;
        let descriptor = pool.utf8(reader.read_u16()?)?;
        if name == "main"
            && descriptor == MAIN_DESCRIPTOR
            && access & (ACC_PUBLIC | ACC_STATIC) == ACC_PUBLIC | ACC_STATIC
        {
            has_main = true;
        }
        collect_descriptor_names(descriptor, &mut references)?;
        skip_attributes(&mut reader)?;
    }

    references.remove(&class_name);

    Ok(ClassSummary {
        class_name,
        references,
        has_main,
    })
}

fn skip_attributes(reader: &mut ByteReader) -> Result<()> {
    let count = reader.read_u16()?;
    for _ in 0..count {
        reader.skip(2)?; // attribute name index
        let length = reader.read_u32()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

/// Cursor over a class byte stream. Every read checks bounds; truncation is
/// a `BadClassFile` error.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let slice = self.take(1)?;
        Ok(slice[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let slice = self.take(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let slice = self.take(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    pub(crate) fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    pub(crate) fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| AnalysisError::bad_class_file("unexpected end of class file"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assembles a minimal class file for the given name, referenced class
    /// constants and method descriptors.
    fn class_bytes(name: &str, class_refs: &[&str], methods: &[(&str, &str, u16)]) -> Vec<u8> {
        let mut pool: Vec<Vec<u8>> = Vec::new();
        let mut utf8 = |pool: &mut Vec<Vec<u8>>, value: &str| -> u16 {
            let mut entry = vec![1u8];
            entry.extend((value.len() as u16).to_be_bytes());
            entry.extend(value.as_bytes());
            pool.push(entry);
            pool.len() as u16
        };
        let mut class = |pool: &mut Vec<Vec<u8>>, value: &str| -> u16 {
            let name_index = {
                let mut entry = vec![1u8];
                entry.extend((value.len() as u16).to_be_bytes());
                entry.extend(value.as_bytes());
                pool.push(entry);
                pool.len() as u16
            };
            let mut entry = vec![7u8];
            entry.extend(name_index.to_be_bytes());
            pool.push(entry);
            pool.len() as u16
        };

        let this_index = class(&mut pool, name);
        let super_index = class(&mut pool, "java/lang/Object");
        for &reference in class_refs {
            class(&mut pool, reference);
        }
        let method_indices: Vec<(u16, u16, u16)> = methods
            .iter()
            .map(|&(method_name, descriptor, access)| {
                (
                    utf8(&mut pool, method_name),
                    utf8(&mut pool, descriptor),
                    access,
                )
            })
            .collect();

        let mut bytes = Vec::new();
        bytes.extend(MAGIC.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // minor
        bytes.extend(52u16.to_be_bytes()); // major
        bytes.extend(((pool.len() + 1) as u16).to_be_bytes());
        for entry in &pool {
            bytes.extend(entry);
        }
        bytes.extend(0x0021u16.to_be_bytes()); // access flags
        bytes.extend(this_index.to_be_bytes());
        bytes.extend(super_index.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // interfaces
        bytes.extend(0u16.to_be_bytes()); // fields
        bytes.extend((method_indices.len() as u16).to_be_bytes());
        for (name_index, descriptor_index, access) in method_indices {
            bytes.extend(access.to_be_bytes());
            bytes.extend(name_index.to_be_bytes());
            bytes.extend(descriptor_index.to_be_bytes());
            bytes.extend(0u16.to_be_bytes()); // attributes
        }
        bytes.extend(0u16.to_be_bytes()); // class attributes
        bytes
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let result = extract(&[0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(matches!(result, Err(AnalysisError::BadClassFile { .. })));
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let mut bytes = class_bytes("P/Q", &[], &[]);
        bytes.truncate(bytes.len() / 2);
        let result = extract(&bytes);
        assert!(matches!(result, Err(AnalysisError::BadClassFile { .. })));
    }

    #[test]
    fn test_extracts_references_from_pool_and_descriptors() {
        let bytes = class_bytes("P/Q", &["P/R", "[LP/S;"], &[("convert", "(LP/T;)LP/U;", 0x0001)]);
        let summary = extract(&bytes).unwrap();
        assert_eq!(summary.class_name, "P.Q");
        assert!(!summary.has_main);
        let expected: Vec<&str> = vec!["P.R", "P.S", "P.T", "P.U", "java.lang.Object"];
        let actual: Vec<&str> = summary.references.iter().map(String::as_str).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_own_name_is_not_a_reference() {
        let bytes = class_bytes("P/Q", &["P/Q"], &[]);
        let summary = extract(&bytes).unwrap();
        assert!(!summary.references.contains("P.Q"));
    }

    #[test]
    fn test_detects_main_method() {
        let bytes = class_bytes(
            "app/Main",
            &[],
            &[("main", "([Ljava/lang/String;)V", 0x0009)],
        );
        assert!(extract(&bytes).unwrap().has_main);

        // an instance method of the same shape is not an entry point
        let bytes = class_bytes(
            "app/Main",
            &[],
            &[("main", "([Ljava/lang/String;)V", 0x0001)],
        );
        assert!(!extract(&bytes).unwrap().has_main);
    }

    #[test]
    fn test_primitive_array_is_not_a_reference() {
        let bytes = class_bytes("P/Q", &["[I", "[[J"], &[]);
        let summary = extract(&bytes).unwrap();
        let only_object: Vec<&str> = summary.references.iter().map(String::as_str).collect();
        assert_eq!(only_object, vec!["java.lang.Object"]);
    }
}
