//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

/// Build an npm-style `.tgz` with every file under `package/`.
pub fn tarball(files: &[(&str, String)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("package/{name}"), content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A JavaScript file with `n` lines.
pub fn js_lines(n: usize) -> String {
    "console.log(1);\n".repeat(n)
}

/// Release payload as returned by the GitHub API, created on `2024-03-{day}`.
pub fn release_json(tag: &str, day: u32) -> Value {
    json!({
        "tag_name": tag,
        "name": tag,
        "created_at": format!("2024-03-{day:02}T12:00:00Z"),
        "prerelease": false,
        "draft": false,
    })
}
