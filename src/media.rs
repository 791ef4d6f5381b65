use std::collections::HashMap;

use log::debug;

use crate::{
    archive::{
        ApkgArchive,
        MEDIA_MEMBER,
    },
    core::AnkipeekError,
};

/// The archive's media index: a JSON object mapping numeric member names to
/// the logical filenames notes refer to. Inverted here so lookups go from
/// filename to member; member bytes stay in the archive until asked for.
#[derive(Debug, Clone, Default)]
pub struct MediaMap {
    member_by_name: HashMap<String, String>,
}

impl MediaMap {
    pub fn parse(json: &str) -> Result<Self, AnkipeekError> {
        let index: HashMap<String, String> = serde_json::from_str(json)?;
        let member_by_name =
            index.into_iter().map(|(member, name)| (name, member)).collect();
        Ok(MediaMap { member_by_name })
    }

    /// Read the index from an archive. An archive without a media member
    /// just has image loading disabled; that is not an error.
    pub fn load(archive: &mut ApkgArchive) -> Result<Option<Self>, AnkipeekError> {
        match archive.member_string(MEDIA_MEMBER) {
            Ok(json) => Ok(Some(MediaMap::parse(&json)?)),
            Err(AnkipeekError::MissingMember(_)) => {
                debug!("No media index in archive; image loading disabled");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Archive member holding the named file, if the index knows it.
    pub fn member_for(&self, logical_name: &str) -> Option<&str> {
        self.member_by_name.get(logical_name).map(String::as_str)
    }

    /// Decompress the named file's bytes out of the archive.
    pub fn file_bytes(
        &self,
        archive: &mut ApkgArchive,
        logical_name: &str,
    ) -> Result<Vec<u8>, AnkipeekError> {
        match self.member_for(logical_name) {
            Some(member) => archive.member_bytes(member),
            None => Err(AnkipeekError::MissingMember(logical_name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.member_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_inverted_to_filename_keys() {
        let media = MediaMap::parse(r#"{"0": "dog.jpg", "1": "cat.png"}"#).unwrap();

        assert_eq!(media.len(), 2);
        assert_eq!(media.member_for("dog.jpg"), Some("0"));
        assert_eq!(media.member_for("cat.png"), Some("1"));
        assert_eq!(media.member_for("missing.gif"), None);
    }

    #[test]
    fn malformed_index_is_a_schema_error() {
        assert!(matches!(MediaMap::parse("[1, 2]"), Err(AnkipeekError::SchemaParse(_))));
    }
}
