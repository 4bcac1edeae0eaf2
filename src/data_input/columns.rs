// src/data_input/columns.rs

//! Column layouts of the packet and state tables.
//!
//! The default layouts come from the flight computer's log format. A format revision is
//! handled by building a new [`ColumnLayout`] and installing it on the session, never by
//! editing the defaults in place.

use indexmap::IndexMap;

use crate::error::{FlightDataError, Result};

/// Fields of one packet sample row, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketField {
    Magic,
    Status,
    TimeUs,
    MainVoltageV,
    PyroVoltageV,
    NumSatellites,
    GpsFixType,
    LatitudeDegrees,
    LongitudeDegrees,
    GpsHmslM,
    BarometerHmslM,
    TemperatureC,
    AccelerationXMss,
    AccelerationYMss,
    AccelerationZMss,
    AngularVelocityXRads,
    AngularVelocityYRads,
    AngularVelocityZRads,
    GaussX,
    GaussY,
    GaussZ,
    KfAccelerationMss,
    KfVelocityMs,
    KfPositionM,
    W,
    X,
    Y,
    Z,
    Checksum,
}

impl PacketField {
    pub const ALL: [PacketField; 29] = [
        PacketField::Magic,
        PacketField::Status,
        PacketField::TimeUs,
        PacketField::MainVoltageV,
        PacketField::PyroVoltageV,
        PacketField::NumSatellites,
        PacketField::GpsFixType,
        PacketField::LatitudeDegrees,
        PacketField::LongitudeDegrees,
        PacketField::GpsHmslM,
        PacketField::BarometerHmslM,
        PacketField::TemperatureC,
        PacketField::AccelerationXMss,
        PacketField::AccelerationYMss,
        PacketField::AccelerationZMss,
        PacketField::AngularVelocityXRads,
        PacketField::AngularVelocityYRads,
        PacketField::AngularVelocityZRads,
        PacketField::GaussX,
        PacketField::GaussY,
        PacketField::GaussZ,
        PacketField::KfAccelerationMss,
        PacketField::KfVelocityMs,
        PacketField::KfPositionM,
        PacketField::W,
        PacketField::X,
        PacketField::Y,
        PacketField::Z,
        PacketField::Checksum,
    ];

    /// Column name as written by the ground-station decoder.
    pub fn name(self) -> &'static str {
        match self {
            PacketField::Magic => "magic",
            PacketField::Status => "status",
            PacketField::TimeUs => "time_us",
            PacketField::MainVoltageV => "main_voltage_v",
            PacketField::PyroVoltageV => "pyro_voltage_v",
            PacketField::NumSatellites => "numSatellites",
            PacketField::GpsFixType => "gpsFixType",
            PacketField::LatitudeDegrees => "latitude_degrees",
            PacketField::LongitudeDegrees => "longitude_degrees",
            PacketField::GpsHmslM => "gps_hMSL_m",
            PacketField::BarometerHmslM => "barometer_hMSL_m",
            PacketField::TemperatureC => "temperature_c",
            PacketField::AccelerationXMss => "acceleration_x_mss",
            PacketField::AccelerationYMss => "acceleration_y_mss",
            PacketField::AccelerationZMss => "acceleration_z_mss",
            PacketField::AngularVelocityXRads => "angular_velocity_x_rads",
            PacketField::AngularVelocityYRads => "angular_velocity_y_rads",
            PacketField::AngularVelocityZRads => "angular_velocity_z_rads",
            PacketField::GaussX => "gauss_x",
            PacketField::GaussY => "gauss_y",
            PacketField::GaussZ => "gauss_z",
            PacketField::KfAccelerationMss => "kf_acceleration_mss",
            PacketField::KfVelocityMs => "kf_velocity_ms",
            PacketField::KfPositionM => "kf_position_m",
            PacketField::W => "w",
            PacketField::X => "x",
            PacketField::Y => "y",
            PacketField::Z => "z",
            PacketField::Checksum => "checksum",
        }
    }

    /// Column offset in the default layout.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fields of one state sample row, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    Magic,
    StateFlags,
    TsArming,
    TsApogee,
    TsDrogueDeploy,
    TsMainDeploy,
    TsSus, // touchdown
}

impl StateField {
    pub const ALL: [StateField; 7] = [
        StateField::Magic,
        StateField::StateFlags,
        StateField::TsArming,
        StateField::TsApogee,
        StateField::TsDrogueDeploy,
        StateField::TsMainDeploy,
        StateField::TsSus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StateField::Magic => "magic",
            StateField::StateFlags => "state_flags",
            StateField::TsArming => "ts_arming",
            StateField::TsApogee => "ts_apogee",
            StateField::TsDrogueDeploy => "ts_drogue_deploy",
            StateField::TsMainDeploy => "ts_main_deploy",
            StateField::TsSus => "ts_sus",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Ordered mapping from column name to column index.
///
/// Iteration follows insertion order, which is also the order stage markers are drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnLayout {
    columns: IndexMap<String, usize>,
}

impl ColumnLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default packet layout (29 columns).
    pub fn packet_default() -> Self {
        PacketField::ALL
            .iter()
            .map(|f| (f.name(), f.index()))
            .collect()
    }

    /// Default state layout (7 columns).
    pub fn state_default() -> Self {
        StateField::ALL
            .iter()
            .map(|f| (f.name(), f.index()))
            .collect()
    }

    /// Add or move a column. Returns the previous index if the name was already mapped.
    pub fn insert(&mut self, name: impl Into<String>, index: usize) -> Option<usize> {
        self.columns.insert(name.into(), index)
    }

    /// Drop a column, keeping the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<usize> {
        self.columns.shift_remove(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns.iter().map(|(name, &index)| (name.as_str(), index))
    }

    /// Check that indices are unique and cover `0..len` exactly.
    ///
    /// Installing a layout never calls this; a broken layout only shows up when a read
    /// hits a missing or out-of-range column.
    pub fn validate(&self) -> Result<()> {
        let mut seen = vec![false; self.columns.len()];
        for (name, &index) in &self.columns {
            let reason = match seen.get_mut(index) {
                Some(slot) if !*slot => {
                    *slot = true;
                    continue;
                }
                Some(_) => "index is used twice".to_string(),
                None => format!("index is outside 0..{}", self.columns.len()),
            };
            return Err(FlightDataError::InvalidLayout {
                name: name.clone(),
                index,
                reason,
            });
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ColumnLayout {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(name, index)| (name.into(), index)).collect(),
        }
    }
}


// src/data_input/columns.rs
