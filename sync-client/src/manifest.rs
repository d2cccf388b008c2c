//! Fetching the remote manifest from a store.

use sync_core::{ManifestBuilder, RemoteManifest};
use sync_store::ObjectStore;
use sync_types::{ContainerName, ObjectKey};
use tracing::{debug, warn};

use crate::error::ClientError;

/// List `container` page by page and build its manifest.
///
/// Keys that are not valid object keys (folder markers and the like) are
/// skipped with a warning since no local file can ever map to them.
pub async fn fetch_manifest<S>(
    store: &S,
    container: &ContainerName,
) -> Result<RemoteManifest, ClientError>
where
    S: ObjectStore + ?Sized,
{
    let mut builder = ManifestBuilder::new(container.clone());

    while !builder.is_finished() {
        let page = store.list_page(container, builder.next_token()).await?;

        let objects = page.objects.into_iter().filter_map(|obj| {
            match ObjectKey::parse(&obj.key) {
                Ok(key) => Some((key, obj.fingerprint)),
                Err(e) => {
                    warn!(container = %container, key = %obj.key, error = %e, "ignoring remote key");
                    None
                }
            }
        });
        builder.add_page(objects, page.next_continuation)?;
    }

    debug!(container = %container, pages = builder.pages(), "fetched remote manifest");
    Ok(builder.build())
}
