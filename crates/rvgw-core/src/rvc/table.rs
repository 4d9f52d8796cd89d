//! The standard RV-C DGN table. Only the handful of DGNs exercised by the
//! testable scenarios and common tank/HVAC entities are populated; this is
//! not a full RV-C data dictionary.
use crate::signal::SignalDef;

pub struct DgnDef {
    pub dgn: u32,
    pub name: &'static str,
    pub signals: &'static [SignalDef],
}

const TANK_STATUS_SIGNALS: &[SignalDef] = &[
    SignalDef::new("instance", 0, 8),
    SignalDef::new("level_percent", 8, 8).scaled(1.0, 0.0).bounded(0.0, 100.0),
];

const DC_SOURCE_STATUS_SIGNALS: &[SignalDef] = &[
    SignalDef::new("instance", 0, 8),
    SignalDef::new("voltage", 8, 16).scaled(0.05, 0.0),
    SignalDef::new("current", 24, 16).scaled(0.05, -1600.0),
];

const THERMOSTAT_STATUS_SIGNALS: &[SignalDef] = &[
    SignalDef::new("instance", 0, 8),
    SignalDef::new("setpoint_temp", 8, 16).scaled(0.03125, -273.0),
    SignalDef::new("ambient_temp", 24, 16).scaled(0.03125, -273.0),
];

static DGN_TABLE: &[DgnDef] = &[
    DgnDef {
        dgn: 0x1FFB7,
        name: "TANK_STATUS",
        signals: TANK_STATUS_SIGNALS,
    },
    DgnDef {
        dgn: 0x1FFFD,
        name: "DC_SOURCE_STATUS_1",
        signals: DC_SOURCE_STATUS_SIGNALS,
    },
    DgnDef {
        dgn: 0x1FFE2,
        name: "THERMOSTAT_STATUS_1",
        signals: THERMOSTAT_STATUS_SIGNALS,
    },
];

pub fn lookup_dgn(dgn: u32) -> Option<&'static DgnDef> {
    DGN_TABLE.iter().find(|d| d.dgn == dgn)
}
