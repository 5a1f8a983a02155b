//! Flash-backed file store
//!
//! Files live as items of a sequential-storage map in the storage partition
//! at the end of flash, keyed by their normalized path. The directory tree
//! is kept by [`IndexedStore`]; this module only moves items in and out of
//! the map.
//!
//! Removed files are overwritten with an empty tombstone; sequential-storage
//! reclaims the space when it compacts.

use alloc::vec;
use alloc::vec::Vec;

use defmt::*;
use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, Key, SerializationError};

use picoware_core::hal::StorageError;
use picoware_core::store::{IndexedStore, ItemStore};

/// 2MB flash on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Storage partition, matching the STORAGE region in memory.x
pub const STORAGE_SIZE: usize = 512 * 1024;
pub const STORAGE_RANGE: core::ops::Range<u32> = ((FLASH_SIZE - STORAGE_SIZE) as u32)..(FLASH_SIZE as u32);

/// Longest path that fits a key
pub const MAX_PATH: usize = 96;
/// Largest item, file or index; an item must fit in one 4K flash page with its header
pub const MAX_FILE_SIZE: usize = 3 * 1024;

/// File store over the on-chip flash
pub type FlashStore<'d> = IndexedStore<FlashItems<'d>>;

/// Open the flash store and load its index
pub fn open<'d>(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> FlashStore<'d> {
    IndexedStore::open(FlashItems::new(flash, dma), MAX_FILE_SIZE)
}

/// Map key: a length-prefixed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKey(heapless::String<MAX_PATH>);

impl PathKey {
    fn new(path: &str) -> Result<Self, StorageError> {
        let mut key = heapless::String::new();
        key.push_str(path).map_err(|_| StorageError::InvalidPath)?;
        Ok(PathKey(key))
    }
}

impl Key for PathKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let bytes = self.0.as_bytes();
        if buffer.len() < bytes.len() + 1 {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = bytes.len() as u8;
        buffer[1..=bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len() + 1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        let len = *buffer.first().ok_or(SerializationError::BufferTooSmall)? as usize;
        let bytes = buffer.get(1..=len).ok_or(SerializationError::BufferTooSmall)?;
        let path = core::str::from_utf8(bytes).map_err(|_| SerializationError::InvalidFormat)?;
        let mut key = heapless::String::new();
        key.push_str(path).map_err(|_| SerializationError::InvalidFormat)?;
        Ok((PathKey(key), len + 1))
    }
}

/// Items of the sequential-storage map
pub struct FlashItems<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    buffer: Vec<u8>,
}

impl<'d> FlashItems<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            buffer: vec![0; MAX_FILE_SIZE + MAX_PATH + 16],
        }
    }
}

impl ItemStore for FlashItems<'_> {
    fn fetch(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let key = PathKey::new(key)?;
        let result = block_on(map::fetch_item::<PathKey, &[u8], _>(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &key,
        ));
        match result {
            Ok(Some(data)) => Ok(Some(Vec::from(data))),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Flash fetch failed: {:?}", Debug2Format(&e));
                Err(StorageError::Io)
            }
        }
    }

    fn store(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = PathKey::new(key)?;
        block_on(map::store_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &key,
            &data,
        ))
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => StorageError::Full,
            _ => StorageError::Io,
        })
    }
}
