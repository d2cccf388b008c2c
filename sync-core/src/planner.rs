//! Per-file sync planning.
//!
//! Planning happens in two steps so the caller decides how to read the
//! file:
//!
//! 1. [`plan_entry`] looks the key up in the manifest. Absent keys are
//!    uploaded without hashing.
//! 2. For keys that exist remotely, the caller fingerprints the local file
//!    and hands the result to [`resolve`].

use sync_types::{Fingerprint, ObjectKey, SyncDecision, UploadReason};

use crate::manifest::RemoteManifest;

/// First planning step for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep<'a> {
    /// The decision needs no local hashing.
    Decided(SyncDecision),
    /// The key exists remotely; compare against this fingerprint.
    NeedsFingerprint(&'a Fingerprint),
}

/// Look `key` up in the manifest.
pub fn plan_entry<'a>(manifest: &'a RemoteManifest, key: &ObjectKey) -> PlanStep<'a> {
    match manifest.get(key) {
        None => PlanStep::Decided(SyncDecision::Upload(UploadReason::New)),
        Some(remote) => PlanStep::NeedsFingerprint(remote),
    }
}

/// Compare a local fingerprint against the remote one.
///
/// `local` is `Ok(None)` for an empty file, which matches only the remote
/// fingerprint of a zero-byte object. A hashing failure is never treated
/// as a match.
pub fn resolve<E: std::fmt::Display>(
    remote: &Fingerprint,
    local: Result<Option<Fingerprint>, E>,
) -> SyncDecision {
    match local {
        Err(e) => SyncDecision::UploadFailed(e.to_string()),
        Ok(local) => {
            let local = local.unwrap_or_else(Fingerprint::empty_object);
            if &local == remote {
                SyncDecision::Skip
            } else {
                SyncDecision::Upload(UploadReason::Changed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestBuilder;
    use sync_types::ContainerName;

    fn manifest_with(key: &str, tag: &str) -> RemoteManifest {
        let mut builder = ManifestBuilder::new(ContainerName::parse("bucket").unwrap());
        builder
            .add_page(
                vec![(ObjectKey::parse(key).unwrap(), Fingerprint::from_remote(tag))],
                None,
            )
            .unwrap();
        builder.build()
    }

    #[test]
    fn absent_key_uploads_without_hashing() {
        let manifest = manifest_with("index.html", "abc");
        let step = plan_entry(&manifest, &ObjectKey::parse("about.html").unwrap());
        assert_eq!(
            step,
            PlanStep::Decided(SyncDecision::Upload(UploadReason::New))
        );
    }

    #[test]
    fn present_key_needs_fingerprint() {
        let manifest = manifest_with("index.html", "abc");
        let step = plan_entry(&manifest, &ObjectKey::parse("index.html").unwrap());
        assert_eq!(
            step,
            PlanStep::NeedsFingerprint(&Fingerprint::from_remote("abc"))
        );
    }

    #[test]
    fn equal_fingerprints_skip() {
        let remote = Fingerprint::single(&[1; 16]);
        let local: Result<_, String> = Ok(Some(Fingerprint::single(&[1; 16])));
        assert_eq!(resolve(&remote, local), SyncDecision::Skip);
    }

    #[test]
    fn different_fingerprints_upload() {
        let remote = Fingerprint::single(&[1; 16]);
        let local: Result<_, String> = Ok(Some(Fingerprint::multipart(&[1; 16], 2)));
        assert_eq!(
            resolve(&remote, local),
            SyncDecision::Upload(UploadReason::Changed)
        );
    }

    #[test]
    fn hashing_failure_is_not_a_skip() {
        let remote = Fingerprint::single(&[1; 16]);
        let local: Result<Option<Fingerprint>, _> = Err("permission denied");
        assert_eq!(
            resolve(&remote, local),
            SyncDecision::UploadFailed("permission denied".into())
        );
    }

    #[test]
    fn empty_file_matches_only_empty_object() {
        let empty: Result<Option<Fingerprint>, String> = Ok(None);
        assert_eq!(
            resolve(&Fingerprint::empty_object(), empty.clone()),
            SyncDecision::Skip
        );
        assert_eq!(
            resolve(&Fingerprint::single(&[9; 16]), empty),
            SyncDecision::Upload(UploadReason::Changed)
        );
    }
}
