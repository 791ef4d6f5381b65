use std::io::{
    Cursor,
    Read,
};

use zip::{
    result::ZipError,
    ZipArchive,
};

use crate::core::AnkipeekError;

/// Member name of the embedded SQLite collection image.
pub const COLLECTION_MEMBER: &str = "collection.anki2";
/// Member name of the JSON media index. Optional; media members themselves
/// are stored under numeric names.
pub const MEDIA_MEMBER: &str = "media";

/// An `.apkg` package held in memory. Members are decompressed lazily, one
/// at a time, so loading a deck never pays for media it doesn't display.
pub struct ApkgArchive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
}

impl ApkgArchive {
    /// Parse the zip central directory over the raw bytes. Fails with
    /// [`AnkipeekError::ArchiveCorrupt`] when the container is unreadable.
    pub fn open(bytes: Vec<u8>) -> Result<Self, AnkipeekError> {
        let zip = ZipArchive::new(Cursor::new(bytes))?;
        Ok(ApkgArchive { zip })
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some()
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    /// Decompress one member. An absent name is [`AnkipeekError::MissingMember`]
    /// so callers can treat optional members as "feature disabled".
    pub fn member_bytes(&mut self, name: &str) -> Result<Vec<u8>, AnkipeekError> {
        let mut member = match self.zip.by_name(name) {
            Ok(member) => member,
            Err(ZipError::FileNotFound) => {
                return Err(AnkipeekError::MissingMember(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut buffer = Vec::with_capacity(member.size() as usize);
        member.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    pub fn member_string(&mut self, name: &str) -> Result<String, AnkipeekError> {
        let bytes = self.member_bytes(name)?;
        String::from_utf8(bytes)
            .map_err(|e| AnkipeekError::Custom(format!("Member '{name}' is not UTF-8: {e}")))
    }

    /// The embedded collection database image.
    pub fn collection_bytes(&mut self) -> Result<Vec<u8>, AnkipeekError> {
        self.member_bytes(COLLECTION_MEMBER)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn zip_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in members {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn members_are_accessible_by_name() {
        let bytes = zip_with(&[(COLLECTION_MEMBER, b"db bytes"), ("0", b"image")]);
        let mut archive = ApkgArchive::open(bytes).unwrap();

        assert!(archive.has_member(COLLECTION_MEMBER));
        assert!(archive.has_member("0"));
        assert_eq!(archive.collection_bytes().unwrap(), b"db bytes");
        assert_eq!(archive.member_bytes("0").unwrap(), b"image");
    }

    #[test]
    fn absent_member_is_missing_not_corrupt() {
        let bytes = zip_with(&[(COLLECTION_MEMBER, b"db bytes")]);
        let mut archive = ApkgArchive::open(bytes).unwrap();

        match archive.member_bytes(MEDIA_MEMBER) {
            Err(AnkipeekError::MissingMember(name)) => assert_eq!(name, MEDIA_MEMBER),
            other => panic!("expected MissingMember, got {other:?}"),
        }
    }

    #[test]
    fn garbage_bytes_are_archive_corrupt() {
        match ApkgArchive::open(b"not a zip at all".to_vec()) {
            Err(AnkipeekError::ArchiveCorrupt(_)) => {}
            Err(other) => panic!("expected ArchiveCorrupt, got {other:?}"),
            Ok(_) => panic!("expected ArchiveCorrupt, got a parsed archive"),
        }
    }
}
