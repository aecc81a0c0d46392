/// Random bits in every generated filename
///
/// At 64 bits the chance of any collision among a million files is about
/// three in a hundred million. Publishing never clobbers regardless.
pub const TOKEN_BITS: u32 = 64;

const PREFIX: &str = "podcast_";
const TOKEN_HEX_LEN: usize = (TOKEN_BITS / 4) as usize;

/// Fresh artifact filename, e.g. `podcast_9f86d081884c7d65.mp3`
pub fn generate_filename(extension: &str) -> String {
    let token: u64 = rand::random();
    format!("{PREFIX}{token:0width$x}.{extension}", width = TOKEN_HEX_LEN)
}

/// Whether `name` has exactly the shape [`generate_filename`] produces
///
/// Used to refuse serving or sweeping anything else from the audio
/// directory (staging files, path tricks, unrelated files).
pub fn is_artifact_name(name: &str, extension: &str) -> bool {
    let Some(rest) = name.strip_prefix(PREFIX) else {
        return false;
    };
    let Some(token) = rest.strip_suffix(extension).and_then(|rest| rest.strip_suffix('.')) else {
        return false;
    };

    token.len() == TOKEN_HEX_LEN && token.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_have_expected_shape() {
        let name = generate_filename("mp3");
        assert!(name.starts_with("podcast_"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(name.len(), "podcast_".len() + 16 + ".mp3".len());
        assert!(is_artifact_name(&name, "mp3"));
    }

    #[test]
    fn foreign_names_are_not_artifacts() {
        for name in [
            "podcast_0123456789abcdef.wav",
            "podcast_0123456789abcde.mp3",
            "podcast_0123456789ABCDEF.mp3",
            "../podcast_0123456789abcdef.mp3",
            ".podcast-staging-x.part",
            "notes.txt",
            "",
        ] {
            assert!(!is_artifact_name(name, "mp3"), "{name} should be rejected");
        }
        assert!(is_artifact_name("podcast_0123456789abcdef.mp3", "mp3"));
    }
}
