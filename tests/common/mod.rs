//! Shared fixture builders: class files and archives are synthesized at
//! test time, no binary fixtures are checked in.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

const MAGIC: u32 = 0xCAFE_BABE;

/// Assembles a class file for the dotted `name`, referencing the dotted
/// class names in `class_refs` as Class constants and carrying one dummy
/// method per entry of `descriptors`. `with_main` adds a
/// `public static void main(String[])` method.
pub fn class_file(name: &str, class_refs: &[&str], descriptors: &[&str], with_main: bool) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = Vec::new();

    fn push_utf8(pool: &mut Vec<Vec<u8>>, value: &str) -> u16 {
        let mut entry = vec![1u8];
        entry.extend((value.len() as u16).to_be_bytes());
        entry.extend(value.as_bytes());
        pool.push(entry);
        pool.len() as u16
    }

    fn push_class(pool: &mut Vec<Vec<u8>>, dotted: &str) -> u16 {
        let internal = dotted.replace('.', "/");
        let name_index = push_utf8(pool, &internal);
        let mut entry = vec![7u8];
        entry.extend(name_index.to_be_bytes());
        pool.push(entry);
        pool.len() as u16
    }

    let this_index = push_class(&mut pool, name);
    let super_index = push_class(&mut pool, "java.lang.Object");
    for reference in class_refs {
        // raw constants may be array descriptors, keep them verbatim
        let name_index = push_utf8(&mut pool, &reference.replace('.', "/"));
        let mut entry = vec![7u8];
        entry.extend(name_index.to_be_bytes());
        pool.push(entry);
    }

    let mut methods: Vec<(u16, u16, u16)> = Vec::new();
    for (number, descriptor) in descriptors.iter().copied().enumerate() {
        let name_index = push_utf8(&mut pool, &format!("helper{number}"));
        let descriptor_index = push_utf8(&mut pool, descriptor);
        methods.push((name_index, descriptor_index, 0x0001));
    }
    if with_main {
        let name_index = push_utf8(&mut pool, "main");
        let descriptor_index = push_utf8(&mut pool, "([Ljava/lang/String;)V");
        methods.push((name_index, descriptor_index, 0x0009));
    }

    let mut bytes = Vec::new();
    bytes.extend(MAGIC.to_be_bytes());
    bytes.extend(0u16.to_be_bytes()); // minor version
    bytes.extend(52u16.to_be_bytes()); // major version
    bytes.extend(((pool.len() + 1) as u16).to_be_bytes());
    for entry in &pool {
        bytes.extend(entry);
    }
    bytes.extend(0x0021u16.to_be_bytes()); // access flags
    bytes.extend(this_index.to_be_bytes());
    bytes.extend(super_index.to_be_bytes());
    bytes.extend(0u16.to_be_bytes()); // interfaces
    bytes.extend(0u16.to_be_bytes()); // fields
    bytes.extend((methods.len() as u16).to_be_bytes());
    for (name_index, descriptor_index, access) in methods {
        bytes.extend(access.to_be_bytes());
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // attributes
    }
    bytes.extend(0u16.to_be_bytes()); // class attributes
    bytes
}

/// Writes the class bytes below `root`, at the path derived from the
/// dotted class name.
pub fn write_class(root: &Path, name: &str, bytes: &[u8]) {
    let relative = format!("{}.class", name.replace('.', "/"));
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create class directory");
    }
    std::fs::write(path, bytes).expect("write class file");
}

/// Creates an archive containing the given (dotted name, bytes) classes.
pub fn write_archive(path: &Path, classes: &[(&str, Vec<u8>)]) {
    let file = File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in classes {
        let entry = format!("{}.class", name.replace('.', "/"));
        writer.start_file(entry, options).expect("start archive entry");
        writer.write_all(bytes).expect("write archive entry");
    }
    writer.finish().expect("finish archive");
}
