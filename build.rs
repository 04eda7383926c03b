// SPDX-License-Identifier: MIT

use std::io::Write;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // For each hid.bin file in our tests/data directory, create one test function
    // that parses and validates that report descriptor
    let datadir: PathBuf = [concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data")]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", datadir.display());

    let out_dir = std::env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?;
    let dest_path = PathBuf::from(&out_dir).join("test-report-descriptors.rs");
    let mut file = std::fs::File::create(dest_path)?;

    writeln!(file, "use hidrdesc::*;")?;
    writeln!(file)?;

    let mut descriptors: Vec<PathBuf> = std::fs::read_dir(&datadir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.to_string_lossy().ends_with(".hid.bin"))
        .collect();
    descriptors.sort();

    for path in descriptors {
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or("Invalid file name")?;
        let funcname = filename.replace([':', '.', '-'], "_");
        writeln!(
            file,
            "
#[test]
#[allow(non_snake_case)]
fn test_{funcname}() {{
    let bytes: Vec<u8> = std::fs::read({path:?}).unwrap();
    let rdesc = ReportDescriptor::try_from(&bytes).expect(&format!(\"Failed to parse {filename}\"));
    assert_eq!(rdesc.validate(), vec![], \"Violations in {filename}\");
    assert!(rdesc.reports().unnumbered().input > 0 || rdesc.reports().report_ids().count() > 0);
}}
"
        )?;
    }

    Ok(())
}
