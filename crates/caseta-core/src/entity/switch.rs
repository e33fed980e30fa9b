use std::fmt;
use std::sync::Arc;

use tracing::debug;

use caseta_api::BridgeClient;

use super::Entity;
use crate::error::CoreError;
use crate::mapper::SwitchPlan;
use crate::model::{EntityDescriptor, SwitchDevice};

/// On/off entity for a switched load.
pub struct CasetaSwitch {
    descriptor: EntityDescriptor,
    device_id: String,
    bridge: Arc<dyn BridgeClient>,
}

impl CasetaSwitch {
    pub fn new(plan: SwitchPlan, bridge: Arc<dyn BridgeClient>) -> Self {
        Self {
            descriptor: plan.descriptor,
            device_id: plan.switch.device_id,
            bridge,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Current record from the bridge's live device table.
    pub fn current(&self) -> Result<SwitchDevice, CoreError> {
        self.bridge
            .get_device_by_id(&self.device_id)
            .map(SwitchDevice::from)
            .ok_or_else(|| {
                caseta_api::Error::DeviceNotFound {
                    device_id: self.device_id.clone(),
                }
                .into()
            })
    }

    /// `false` when the device has disappeared from the bridge.
    pub fn is_on(&self) -> bool {
        self.current().is_ok_and(|switch| switch.is_on())
    }

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        debug!(device_id = %self.device_id, "turning switch on");
        self.bridge.turn_on(&self.device_id).await?;
        Ok(())
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        debug!(device_id = %self.device_id, "turning switch off");
        self.bridge.turn_off(&self.device_id).await?;
        Ok(())
    }
}

impl Entity for CasetaSwitch {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for CasetaSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasetaSwitch")
            .field("unique_id", &self.descriptor.unique_id)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}
