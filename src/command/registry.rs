//! Finite registry of recognised command names
//!
//! The catalog below is carried from the StackLink Command Manual and covers
//! diagnostics, hardware management, logging, direct I/O, general movement,
//! lift operations, meta operations, plate movement, and the settings
//! categories. Only a subset has a mock implementation; the rest are
//! recognised but answer `9999 No mock implementation for this command`,
//! which keeps LISTCOMMANDS output and the unrecognised-vs-unimplemented
//! distinction faithful to the device.

use std::collections::HashMap;

use super::handlers::{info, lift, movement, sensors};
use super::Handler;

/// Every command name the device recognises, in catalog order.
pub const CATALOG: &[&str] = &[
    // Diagnostics
    "ClearCounter",
    "ClearCounters",
    "DumpInputState",
    "DumpOutputState",
    "DumpStops",
    "GetFileData",
    "GetFileList",
    "GetFileSize",
    "GetLoopCounter",
    "GetStackSensors",
    "GetStopControlStates",
    "GetStopOutputStates",
    "GetStopSensors",
    "IncrementCounter",
    "ListCounters",
    "ListLabLinxException",
    "ListMetrics",
    "ListRawMetrics",
    "MovePlateTest",
    "TestLift",
    "TestStops",
    // Hardware management
    "GetClockTime",
    "GetClockTimezone",
    "GetCpuInfo",
    "GetDiskInfo",
    "GetFirmwareUptime",
    "GetMemoryUsage",
    "GetOsInfo",
    "GetSystemUptime",
    "GetUptime",
    "ListClockTimezones",
    "ListComPorts",
    "SendTo",
    "SetClockTime",
    "SetClockTimezone",
    "Shutdown",
    "Terminal",
    // Logging
    "GetLogLevel",
    "GetLogPath",
    "ListBootLog",
    "ListLog",
    "ListLogSources",
    "LogCommands",
    "SetLogLevel",
    // General direct I/O
    "ListIOs",
    "ReadAnalog",
    "ReadInp",
    "ReadInput",
    "WriteAnalog",
    "WriteOut",
    "WriteOutput",
    // General movement
    "CalculateMoveSpeed",
    "CalculateMoveTime",
    "EStop",
    "GetAutoHome",
    "GetPos",
    "GetPosition",
    "GetSpeed",
    "Halt",
    "Home",
    "Jog",
    "Move",
    "Move_Abs",
    "MoveAxes",
    "MoveAxis",
    "MoveFast",
    "SetAutoHome",
    "SetSpeed",
    "ShiftedMove",
    "Status",
    // Lift commands
    "Dispense",
    "Return",
    // Meta commands
    "Can",
    "DeleteSettingsFile",
    "GetSerialNumber",
    "GetSettings",
    "ListCommands",
    "ListParameters",
    "ListParams",
    "ListSettings",
    "Version",
    // Plate movement
    "AcknowledgeSend",
    "CompoundShift",
    "ConveyorOff",
    "ConveyorOn",
    "GetIgnoreStop",
    "GetIgnoreStops",
    "HasPlate",
    "IgnoreAllStops",
    "IgnoreStop",
    "IgnoreStopRange",
    "MovePlate",
    "ReceivePlate",
    "SendPlate",
    "ShiftPlates",
    // Settings - motor configuration
    "ClearMotionOverrides",
    "DeleteMotionProfile",
    "GetAxes",
    "GetAxisProfile",
    "GetDefaultMotion",
    "GetEStopAxes",
    "GetHomeMotion",
    "GetLimits",
    "GetMotionProfile",
    "GetPrimaryAxes",
    "GetSecondaryAxes",
    "GetStepsPerUnit",
    "GetSynchronizeMotion",
    "ListAxisProfiles",
    "ListDefaultMotions",
    "ListHomeMotions",
    "ListMotionProfiles",
    "SetAxisProfile",
    "SetDefaultMotion",
    "SetEStopAxes",
    "SetHomeMotion",
    "SetLimits",
    "SetMotionProfile",
    "SetSynchronizeMotion",
    // Settings - network configuration
    "GetCurrentIP",
    "GetDefaultGateway",
    "GetDNS",
    "GetHostName",
    "GetIP",
    "GetIPAddress",
    "GetSubnetMask",
    "GetUseDHCP",
    "ListNetworkSettings",
    "SetDefaultGateway",
    "SetDNS",
    "SetHostName",
    "SetIP",
    "SetIPAddress",
    "SetSubnetMask",
    "SetUseDHCP",
    // Settings - point management
    "AddCoordinates",
    "ClearPoints",
    "ConstrainPoint",
    "DeletePoint",
    "GetPoint",
    "Here",
    "ListPoints",
    "LoadPoint",
    "RemoveCoordinates",
    "Set",
    "SetShifted",
    "Shift",
    // Settings - stop management
    "AddStop",
    "GetStopFlags",
    "GetStopName",
    "GetStopPort",
    "InsertStop",
    "ListStops",
    "MoveStop",
    "RemoveAllStops",
    "RemoveStop",
    "RenameStop",
    "SetStopFlags",
    "SetStopName",
    "SetStopPort",
    "SwapStops",
    // Settings - track configuration
    "GetAutoStop",
    "GetAutoStopTime",
    "GetHighSpeedDistance",
    "GetMoveTime",
    "GetNumTracks",
    "GetPartners",
    "GetShiftTimeout",
    "GetTrackSettings",
    "ListTrackSettings",
    "SendToPartner",
    "SetAutoStop",
    "SetAutoStopTime",
    "SetHighSpeedDistance",
    "SetMoveTime",
    "SetPartners",
    "SetShiftTimeout",
    "SetTrackSettings",
];

/// Catalog names containing `filter` (case-insensitive), in catalog order.
/// An empty filter matches everything.
pub fn matching_names(filter: &str) -> Vec<&'static str> {
    let needle = filter.to_ascii_lowercase();
    CATALOG
        .iter()
        .copied()
        .filter(|name| needle.is_empty() || name.to_ascii_lowercase().contains(&needle))
        .collect()
}

/// How a recognised command is serviced.
#[derive(Clone, Copy)]
pub enum CommandKind {
    Implemented(Handler),
    /// Recognised by the device but without a mock implementation.
    Stub,
}

/// Case-insensitive lookup table over the catalog.
pub struct Registry {
    by_name: HashMap<String, CommandKind>,
}

impl Registry {
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(CATALOG.len());
        for name in CATALOG {
            let kind = match implementation(name) {
                Some(handler) => CommandKind::Implemented(handler),
                None => CommandKind::Stub,
            };
            by_name.insert(name.to_ascii_uppercase(), kind);
        }
        Self { by_name }
    }

    /// Look up a command by name, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<CommandKind> {
        self.by_name.get(&name.to_ascii_uppercase()).copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock implementations, keyed by canonical catalog name.
fn implementation(name: &str) -> Option<Handler> {
    Some(match name {
        "Version" => info::version,
        "ListCommands" => info::list_commands,
        "GetNumTracks" => info::get_num_tracks,
        "ListStops" => info::list_stops,
        "GetStopSensors" => sensors::get_stop_sensors,
        "HasPlate" => sensors::has_plate,
        "GetIgnoreStop" => sensors::get_ignore_stop,
        "GetIgnoreStops" => sensors::get_ignore_stops,
        "IgnoreStop" => sensors::ignore_stop,
        "IgnoreStopRange" => sensors::ignore_stop_range,
        "IgnoreAllStops" => sensors::ignore_all_stops,
        "Dispense" => lift::dispense,
        "Return" => lift::retrieve,
        "MovePlate" => movement::move_plate,
        "ShiftPlates" => movement::shift_plates,
        "SendPlate" => movement::send_plate,
        "ReceivePlate" => movement::receive_plate,
        "AcknowledgeSend" => movement::acknowledge_send,
        _ => return None,
    })
}
