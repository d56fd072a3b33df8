use super::DeviceProfile;

/// Raspberry Pi official 7" touchscreen (FT5406 controller, firmware-polled).
///
/// The firmware driver exposes up to 10 contacts through the Type B slot protocol
/// and mirrors the first contact on ABS_X/ABS_Y.
pub const FT5406: DeviceProfile = DeviceProfile {
    name: "Raspberry Pi 7\" Touchscreen",
    evdev_name: "FT5406 memory based driver",
    slots: 10,
};
