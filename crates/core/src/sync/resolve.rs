use crate::content::model::SiteContent;

/// How close (ms) a draft's version may be to this client's last publish
/// and still count as that publish echoing back rather than a new edit.
pub const PUBLISH_ECHO_BUFFER_MS: u64 = 1000;

/// Last-writer-wins reconciliation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub publish_echo_buffer_ms: u64,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            publish_echo_buffer_ms: PUBLISH_ECHO_BUFFER_MS,
        }
    }
}

/// Outcome of reconciling the local draft with the published snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The local draft is a newer, unpublished edit.
    KeepLocal,
    /// The published snapshot wins, already merged over defaults.
    AdoptRemote(SiteContent),
    /// Nothing published could be read; the local draft stays, unconfirmed.
    LocalOnly,
    /// Neither source exists.
    Defaults,
}

impl Resolution {
    pub fn has_unsaved_changes(&self) -> bool {
        matches!(self, Resolution::KeepLocal | Resolution::LocalOnly)
    }

    pub fn source(&self) -> &'static str {
        match self {
            Resolution::KeepLocal | Resolution::LocalOnly => "local",
            Resolution::AdoptRemote(_) => "remote",
            Resolution::Defaults => "defaults",
        }
    }
}

/// Decide which document is authoritative.
///
/// The local draft is kept only when it is strictly newer than the snapshot
/// and its version is more than the echo buffer away from `last_published`.
/// Timestamps are the only ordering; no field-level merge is attempted.
pub fn resolve(
    local: Option<&SiteContent>,
    remote: Option<SiteContent>,
    last_published: i64,
    policy: &SyncPolicy,
) -> Resolution {
    let Some(remote) = remote else {
        return match local {
            Some(_) => Resolution::LocalOnly,
            None => Resolution::Defaults,
        };
    };

    let cloud_time = remote.updated_at;
    if let Some(local) = local {
        let local_time = local.updated_at;
        if local_time > cloud_time
            && local_time.abs_diff(last_published) > policy.publish_echo_buffer_ms
        {
            return Resolution::KeepLocal;
        }
    }

    Resolution::AdoptRemote(remote.merged_over_defaults())
}
