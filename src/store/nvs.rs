//! NVS backing for the credential region.
//!
//! Persists the 512-byte region as one raw blob in the ESP32's Non-Volatile
//! Storage so credentials survive reboots.

use super::block::{StorageBlock, REGION_SIZE};
use super::StoreError;
use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use esp_idf_sys::EspError;

/// NVS namespace for the portal.
const NVS_NAMESPACE: &str = "portal";

/// NVS key for the credential region.
const NVS_KEY: &str = "credentials";

/// Credential region stored as an NVS raw blob.
pub struct NvsBlock {
    nvs: EspNvs<NvsDefault>,
}

impl NvsBlock {
    /// Open (creating if needed) the portal namespace on the default NVS
    /// partition.
    pub fn new() -> Result<Self, EspError> {
        let partition = EspNvsPartition::<NvsDefault>::take()?;
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs })
    }
}

impl StorageBlock for NvsBlock {
    fn read(&self, region: &mut [u8; REGION_SIZE]) -> Result<(), StoreError> {
        // A missing key reads as an erased region
        region.fill(0);
        let _ = self.nvs.get_raw(NVS_KEY, region)?;
        Ok(())
    }

    fn write(&mut self, region: &[u8; REGION_SIZE]) -> Result<(), StoreError> {
        self.nvs.set_raw(NVS_KEY, region)?;
        Ok(())
    }
}
