use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, U256};
use lru::LruCache;

use crate::data::types::Room;

/// TTL durations for cached reads. Confirmed writes invalidate regardless.
const ROOMS_TTL: Duration = Duration::from_secs(30);
const OWNER_TTL: Duration = Duration::from_secs(3600); // ownership transfers are rare
const ALLOWANCE_TTL: Duration = Duration::from_secs(30);

const ALLOWANCE_CACHE_SIZE: usize = 64;

/// Shared cache of contract reads: rooms, owner, and allowances keyed by
/// (owner, spender).
///
/// `generation` advances on every invalidation. A read captures it before
/// going to the node and must not store or report its result if it changed
/// in the meantime.
pub struct ContractCache {
    generation: u64,
    rooms: Option<(Instant, Vec<Room>)>,
    owner: Option<(Instant, Address)>,
    allowances: LruCache<(Address, Address), (Instant, U256)>,
}

impl ContractCache {
    pub fn new() -> Self {
        Self {
            generation: 0,
            rooms: None,
            owner: None,
            allowances: LruCache::new(
                NonZeroUsize::new(ALLOWANCE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if an invalidation happened after `generation` was captured.
    pub fn is_stale(&self, generation: u64) -> bool {
        self.generation != generation
    }

    // --- Rooms ---

    /// Get the cached room list, returning a clone. Returns None if expired or missing.
    pub fn get_rooms(&self) -> Option<Vec<Room>> {
        let (instant, rooms) = self.rooms.as_ref()?;
        if instant.elapsed() < ROOMS_TTL {
            Some(rooms.clone())
        } else {
            None
        }
    }

    pub fn put_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = Some((Instant::now(), rooms));
    }

    // --- Owner ---

    pub fn get_owner(&self) -> Option<Address> {
        let (instant, owner) = self.owner.as_ref()?;
        if instant.elapsed() < OWNER_TTL {
            Some(*owner)
        } else {
            None
        }
    }

    pub fn put_owner(&mut self, owner: Address) {
        self.owner = Some((Instant::now(), owner));
    }

    // --- Allowance ---

    pub fn get_allowance(&mut self, owner: Address, spender: Address) -> Option<U256> {
        let key = (owner, spender);
        let entry = self.allowances.get(&key)?;
        if entry.0.elapsed() < ALLOWANCE_TTL {
            Some(entry.1)
        } else {
            self.allowances.pop(&key);
            None
        }
    }

    pub fn put_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances
            .put((owner, spender), (Instant::now(), amount));
    }

    /// Drop every cached read. Called after a confirmed write and on manual refresh.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.rooms = None;
        self.owner = None;
        self.allowances.clear();
    }
}

impl Default for ContractCache {
    fn default() -> Self {
        Self::new()
    }
}
