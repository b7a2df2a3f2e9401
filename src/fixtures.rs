//! Sample documents shared by the unit tests.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CONTENTS_XML: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<outline xmlns="http://www.omnigroup.com/namespace/OmniOutliner/v5" xmlns:style="http://www.omnigroup.com/namespace/OmniStyle/v5">
  <style-attribute-registry>
    <style-attribute-definition key="font-size" group="font" name="size" type="number" default="12"/>
  </style-attribute-registry>
  <columns>
    <column id="c1" type="text" is-outline-column="yes">
      <title><text><p><run><lit>Topic</lit></run></p></text></title>
    </column>
  </columns>
  <root>
    <item id="i1" expanded="yes">
      <values>
        <text><p><run><lit>Project: {{project}}</lit></run></p></text>
      </values>
      <children>
        <item id="i2">
          <values>
            <text><p><run><style><value key="font-size">14</value></style><lit>Q&amp;A for {{owner}}</lit></run></p></text>
          </values>
          <note><text><p><run><lit>Plain note</lit></run></p></text></note>
        </item>
      </children>
    </item>
  </root>
</outline>
"#;

pub const METADATA_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>kMDItemAuthors</key>
	<array>
		<string>S. User</string>
	</array>
	<key>kMDItemSubject</key>
	<string>Testing</string>
</dict>
</plist>
"#;

const PREVIEW: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
const ATTACHMENT: &[u8] = b"attached file\n";

/// The sample document as zip bytes.
pub fn archive_bytes() -> Vec<u8> {
    archive_bytes_with(CONTENTS_XML, Some(METADATA_XML))
}

/// A document archive with the given content and, optionally, metadata.
pub fn archive_bytes_with(contents: &str, metadata: Option<&str>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    writer.start_file("contents.xml", deflated).unwrap();
    writer.write_all(contents.as_bytes()).unwrap();
    if let Some(metadata) = metadata {
        writer.start_file("metadata.xml", deflated).unwrap();
        writer.write_all(metadata.as_bytes()).unwrap();
    }
    writer.start_file("preview.jpeg", stored).unwrap();
    writer.write_all(PREVIEW).unwrap();
    writer.add_directory("attachments/", stored).unwrap();
    writer.start_file("attachments/notes.txt", deflated).unwrap();
    writer.write_all(ATTACHMENT).unwrap();

    writer.finish().unwrap().into_inner()
}

/// Write the sample archive to `dir/name`.
pub fn write_archive(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, archive_bytes()).unwrap();
    path
}

/// Write the sample document as a package directory at `dir/name`.
pub fn write_directory(dir: &Path, name: &str) -> PathBuf {
    let root = dir.join(name);
    fs::create_dir_all(root.join("attachments")).unwrap();
    fs::write(root.join("contents.xml"), CONTENTS_XML).unwrap();
    fs::write(root.join("metadata.xml"), METADATA_XML).unwrap();
    fs::write(root.join("preview.jpeg"), PREVIEW).unwrap();
    fs::write(root.join("attachments").join("notes.txt"), ATTACHMENT).unwrap();
    root
}
