//! Fixed-offset credential region.
//!
//! The record is one 512-byte region with a NUL-terminated network id at
//! offset 0 and a NUL-terminated secret at offset 32, the layout older
//! devices used for their EEPROM page. [`BlockStore`] reads and writes the
//! region through a [`StorageBlock`], which is an NVS blob on the device
//! (`store::nvs`) and an in-memory array in tests.

use super::{Credential, CredentialStore, StoreError};
use log::info;

/// Size of the credential region in bytes.
pub const REGION_SIZE: usize = 512;

/// Offset of the NUL-terminated network id.
const ID_OFFSET: usize = 0;

/// Offset of the NUL-terminated secret.
const SECRET_OFFSET: usize = 32;

/// Longest network id the region can hold (terminator excluded).
pub const MAX_ID_LEN: usize = SECRET_OFFSET - ID_OFFSET - 1;

/// Longest secret the region can hold (terminator excluded).
pub const MAX_SECRET_LEN: usize = REGION_SIZE - SECRET_OFFSET - 1;

/// Byte-region backing for [`BlockStore`].
pub trait StorageBlock {
    /// Fill `region` with the persisted bytes. A backing that has never been
    /// written must yield an all-zero region.
    fn read(&self, region: &mut [u8; REGION_SIZE]) -> Result<(), StoreError>;

    /// Persist the whole region.
    fn write(&mut self, region: &[u8; REGION_SIZE]) -> Result<(), StoreError>;
}

/// Volatile region backing for tests and host development.
pub struct MemoryBlock {
    region: [u8; REGION_SIZE],
}

impl MemoryBlock {
    /// Create an erased (all-zero) region.
    pub fn new() -> Self {
        Self {
            region: [0; REGION_SIZE],
        }
    }
}

impl Default for MemoryBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBlock for MemoryBlock {
    fn read(&self, region: &mut [u8; REGION_SIZE]) -> Result<(), StoreError> {
        region.copy_from_slice(&self.region);
        Ok(())
    }

    fn write(&mut self, region: &[u8; REGION_SIZE]) -> Result<(), StoreError> {
        self.region.copy_from_slice(region);
        Ok(())
    }
}

/// Credential store over a fixed-offset byte region.
pub struct BlockStore<B> {
    block: B,
}

impl<B: StorageBlock> BlockStore<B> {
    /// Create a store over the given region backing.
    pub fn new(block: B) -> Self {
        Self { block }
    }

    fn encode(credential: &Credential) -> Result<[u8; REGION_SIZE], StoreError> {
        check_field("network id", &credential.network_id, MAX_ID_LEN)?;
        check_field("secret", &credential.secret, MAX_SECRET_LEN)?;

        // Zero-filled region: terminators and padding come for free, and a
        // shorter record leaves no residue of the previous one
        let mut region = [0u8; REGION_SIZE];
        let id = credential.network_id.as_bytes();
        let secret = credential.secret.as_bytes();
        region[ID_OFFSET..ID_OFFSET + id.len()].copy_from_slice(id);
        region[SECRET_OFFSET..SECRET_OFFSET + secret.len()].copy_from_slice(secret);
        Ok(region)
    }

    fn decode(region: &[u8; REGION_SIZE]) -> Result<Option<Credential>, StoreError> {
        let network_id = read_field(&region[ID_OFFSET..SECRET_OFFSET])?;
        if network_id.is_empty() {
            // Erased region: nothing stored yet
            return Ok(None);
        }
        let secret = read_field(&region[SECRET_OFFSET..])?;
        Ok(Some(Credential::new(network_id, secret)))
    }
}

fn check_field(field: &'static str, value: &str, max: usize) -> Result<(), StoreError> {
    if value.len() > max {
        return Err(StoreError::ValueTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    if value.as_bytes().contains(&0) {
        return Err(StoreError::InvalidValue {
            field,
            reason: "contains a NUL byte",
        });
    }
    Ok(())
}

fn read_field(slot: &[u8]) -> Result<&str, StoreError> {
    let end = slot
        .iter()
        .position(|&b| b == 0)
        .ok_or(StoreError::Corrupt("field not NUL terminated"))?;
    std::str::from_utf8(&slot[..end]).map_err(|_| StoreError::Corrupt("field is not valid UTF-8"))
}

impl<B: StorageBlock> CredentialStore for BlockStore<B> {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        let mut region = [0u8; REGION_SIZE];
        self.block.read(&mut region)?;
        Self::decode(&region)
    }

    fn save(&mut self, credential: &Credential) -> Result<(), StoreError> {
        let region = Self::encode(credential)?;
        self.block.write(&region)?;
        info!("Credentials saved to block storage");
        Ok(())
    }
}
