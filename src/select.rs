//! Picking one torrent per group.
//!
//! Rules, applied to each group's torrents in order:
//!
//! 1. Links (`TorrentType` other than `Torrent`) and GameDOX releases are
//!    never candidates.
//! 2. A snatched candidate means the account already has the game: the group
//!    is dropped, including any pick made for it on an earlier page.
//! 3. Otherwise the candidate with the most seeders wins; on a tie the higher
//!    torrent id (the newer upload) wins.
//!
//! [`Selection`] accumulates picks across search pages and consoles.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::client::{Torrent, TorrentGroup};

/// The torrent chosen for a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTorrent {
    pub torrent_id: u64,
    pub group_id: u64,
    pub release_title: String,
    pub seeders: u64,
}

impl From<&Torrent> for SelectedTorrent {
    fn from(torrent: &Torrent) -> Self {
        Self {
            torrent_id: torrent.id,
            group_id: torrent.group_id,
            release_title: torrent.release_title.clone(),
            seeders: torrent.seeders,
        }
    }
}

/// Outcome of looking at one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDecision {
    /// This torrent is the group's best candidate.
    Selected(SelectedTorrent),
    /// The account already snatched a release in this group.
    Snatched { release_title: String },
    /// No torrent in the group is a candidate.
    NoCandidates,
}

/// Returns true when a torrent may be selected at all.
#[must_use]
pub fn is_candidate(torrent: &Torrent) -> bool {
    torrent.is_torrent() && !torrent.is_game_dox()
}

/// Returns true when `challenger` should replace `current` as the group's pick.
fn outranks(challenger: &Torrent, current: &Torrent) -> bool {
    (challenger.seeders, challenger.id) > (current.seeders, current.id)
}

/// Decides which torrent, if any, to take from a single group.
#[must_use]
pub fn select_from_group(group: &TorrentGroup) -> GroupDecision {
    let mut best: Option<&Torrent> = None;
    for torrent in group.torrents.iter().filter(|t| is_candidate(t)) {
        if torrent.snatched {
            return GroupDecision::Snatched {
                release_title: torrent.release_title.clone(),
            };
        }
        if best.is_none_or(|current| outranks(torrent, current)) {
            best = Some(torrent);
        }
    }
    best.map_or(GroupDecision::NoCandidates, |torrent| {
        GroupDecision::Selected(torrent.into())
    })
}

/// Picks accumulated over every search page of a run, keyed by group id.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    picks: BTreeMap<u64, SelectedTorrent>,
    snatched: BTreeSet<u64>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one group into the selection.
    ///
    /// A group seen again on a later page competes with its earlier pick; a
    /// group that was ever found snatched stays excluded.
    pub fn consider(&mut self, group: &TorrentGroup) {
        if self.snatched.contains(&group.id) {
            return;
        }
        match select_from_group(group) {
            GroupDecision::Selected(pick) => {
                let replace = self.picks.get(&group.id).is_none_or(|current| {
                    (pick.seeders, pick.torrent_id) > (current.seeders, current.torrent_id)
                });
                if replace {
                    debug!(
                        group_id = group.id,
                        torrent_id = pick.torrent_id,
                        seeders = pick.seeders,
                        "selected torrent"
                    );
                    self.picks.insert(group.id, pick);
                }
            }
            GroupDecision::Snatched { release_title } => {
                info!(group_id = group.id, release = %release_title, "group already snatched, skipping");
                self.picks.remove(&group.id);
                self.snatched.insert(group.id);
            }
            GroupDecision::NoCandidates => {
                debug!(group_id = group.id, "group has no candidate torrents");
            }
        }
    }

    /// Folds a whole search page into the selection.
    pub fn consider_all<'a>(&mut self, groups: impl IntoIterator<Item = &'a TorrentGroup>) {
        for group in groups {
            self.consider(group);
        }
    }

    /// Number of groups with a pick.
    #[must_use]
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Number of groups excluded because they were already snatched.
    #[must_use]
    pub fn snatched_count(&self) -> usize {
        self.snatched.len()
    }

    /// Picks in ascending group id order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedTorrent> {
        self.picks.values()
    }

    /// Consumes the selection, returning picks in ascending group id order.
    #[must_use]
    pub fn into_picks(self) -> Vec<SelectedTorrent> {
        self.picks.into_values().collect()
    }
}
