use crate::types::*;
use bitflags::bitflags;

/// A device table or variation index, adjusting a value at particular
/// sizes or design-space locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Device {
    /// Pixel adjustments per ppem size, used for hinting.
    Hinting {
        start_size: uint16,
        end_size: uint16,
        deltas: Vec<int16>,
    },
    /// A reference into the item variation store.
    VariationIndex {
        outer_index: uint16,
        inner_index: uint16,
    },
}

impl Device {
    /// True for ppem-based hinting adjustments.
    pub fn is_hinting(&self) -> bool {
        matches!(self, Device::Hinting { .. })
    }
}

/// Drops a device table if it only carries hinting.
pub(crate) fn prune_device_hints(device: &mut Option<Device>) {
    if device.as_ref().map_or(false, |d| d.is_hinting()) {
        *device = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs, non_snake_case, non_camel_case_types)]
pub struct ValueRecord {
    pub xPlacement: Option<int16>,
    pub yPlacement: Option<int16>,
    pub xAdvance: Option<int16>,
    pub yAdvance: Option<int16>,
    pub xPlaDevice: Option<Device>,
    pub yPlaDevice: Option<Device>,
    pub xAdvDevice: Option<Device>,
    pub yAdvDevice: Option<Device>,
}

bitflags! {
    /// Flags used when serializing/deserializing the value record.
    ///
    /// These are computed automatically, so you don't need to worry about them.
    pub struct ValueRecordFlags: u16 {
            ///	Includes horizontal adjustment for placement
            const X_PLACEMENT = 0x0001;
            ///	Includes vertical adjustment for placement
            const Y_PLACEMENT = 0x0002;
            ///	Includes horizontal adjustment for advance
            const X_ADVANCE = 0x0004;
            ///	Includes vertical adjustment for advance
            const Y_ADVANCE = 0x0008;
            ///	Includes Device table (non-variable font) / VariationIndex table (variable font) for horizontal placement
            const X_PLACEMENT_DEVICE = 0x0010;
            ///	Includes Device table (non-variable font) / VariationIndex table (variable font) for vertical placement
            const Y_PLACEMENT_DEVICE = 0x0020;
            ///	Includes Device table (non-variable font) / VariationIndex table (variable font) for horizontal advance
            const X_ADVANCE_DEVICE = 0x0040;
            ///	Includes Device table (non-variable font) / VariationIndex table (variable font) for vertical advance
            const Y_ADVANCE_DEVICE = 0x0080;
    }
}

impl ValueRecord {
    pub fn new() -> ValueRecord {
        ValueRecord::default()
    }

    /// The value format needed to encode this record.
    pub fn flags(&self) -> ValueRecordFlags {
        let mut f = ValueRecordFlags::empty();
        f.set(ValueRecordFlags::X_PLACEMENT, self.xPlacement.is_some());
        f.set(ValueRecordFlags::Y_PLACEMENT, self.yPlacement.is_some());
        f.set(ValueRecordFlags::X_ADVANCE, self.xAdvance.is_some());
        f.set(ValueRecordFlags::Y_ADVANCE, self.yAdvance.is_some());
        f.set(ValueRecordFlags::X_PLACEMENT_DEVICE, self.xPlaDevice.is_some());
        f.set(ValueRecordFlags::Y_PLACEMENT_DEVICE, self.yPlaDevice.is_some());
        f.set(ValueRecordFlags::X_ADVANCE_DEVICE, self.xAdvDevice.is_some());
        f.set(ValueRecordFlags::Y_ADVANCE_DEVICE, self.yAdvDevice.is_some());
        f
    }

    /// Removes hinting device tables, keeping variation indices.
    pub fn prune_hints(&mut self) {
        prune_device_hints(&mut self.xPlaDevice);
        prune_device_hints(&mut self.yPlaDevice);
        prune_device_hints(&mut self.xAdvDevice);
        prune_device_hints(&mut self.yAdvDevice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prune_hints_keeps_variations() {
        let mut vr = ValueRecord {
            xAdvance: Some(20),
            xAdvDevice: Some(Device::Hinting {
                start_size: 9,
                end_size: 10,
                deltas: vec![1, -1],
            }),
            xPlaDevice: Some(Device::VariationIndex {
                outer_index: 0,
                inner_index: 3,
            }),
            ..Default::default()
        };
        vr.prune_hints();
        assert_eq!(
            vr.flags(),
            ValueRecordFlags::X_ADVANCE | ValueRecordFlags::X_PLACEMENT_DEVICE
        );
    }
}
