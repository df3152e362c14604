//! Column roles and dataset layouts.

use std::fmt;

use iv_core::Unit;

/// Physical meaning of a measured column.
///
/// Roles are resolved against table headers once, at construction; all later
/// access goes through the role, never through the header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    DrainVoltage,
    DrainCurrent,
    GateVoltage,
    GateCurrent,
    SourceVoltage,
    SourceCurrent,
    CarrierDensity,
    Resistance,
    ChannelLength,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::DrainVoltage,
        Role::DrainCurrent,
        Role::GateVoltage,
        Role::GateCurrent,
        Role::SourceVoltage,
        Role::SourceCurrent,
        Role::CarrierDensity,
        Role::Resistance,
        Role::ChannelLength,
    ];

    /// Short key used in column selectors such as `vg_fwd`.
    pub fn key(self) -> &'static str {
        match self {
            Role::DrainVoltage => "vd",
            Role::DrainCurrent => "id",
            Role::GateVoltage => "vg",
            Role::GateCurrent => "ig",
            Role::SourceVoltage => "vs",
            Role::SourceCurrent => "is",
            Role::CarrierDensity => "n",
            Role::Resistance => "r",
            Role::ChannelLength => "l",
        }
    }

    pub fn from_key(key: &str) -> Option<Role> {
        let key = key.to_ascii_lowercase();
        Role::ALL.into_iter().find(|r| r.key() == key)
    }

    /// Unit the raw table values of this role are read in.
    pub fn unit(self) -> Unit {
        match self {
            Role::DrainVoltage | Role::GateVoltage | Role::SourceVoltage => Unit::VOLT,
            Role::DrainCurrent | Role::GateCurrent | Role::SourceCurrent => Unit::AMPERE,
            Role::CarrierDensity => Unit::PER_SQ_CENTIMETER,
            Role::Resistance => Unit::OHM_MICROMETER,
            Role::ChannelLength => Unit::MICROMETER,
        }
    }

    /// Header fragments searched for when no explicit names are given.
    pub fn default_names(self) -> &'static [&'static str] {
        match self {
            Role::GateVoltage => &["gatev", "vgate", "vg"],
            Role::GateCurrent => &["gatei", "igate", "ig"],
            Role::DrainVoltage => &["drainv", "vdrain", "vd"],
            Role::DrainCurrent => &["draini", "idrain"],
            Role::SourceVoltage => &["sourcev", "vsource", "vs"],
            Role::SourceCurrent => &["sourcei", "isource", "is"],
            Role::CarrierDensity => &["density"],
            Role::Resistance => &["resistance"],
            Role::ChannelLength => &["length"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::DrainVoltage => "drain voltage",
            Role::DrainCurrent => "drain current",
            Role::GateVoltage => "gate voltage",
            Role::GateCurrent => "gate current",
            Role::SourceVoltage => "source voltage",
            Role::SourceCurrent => "source current",
            Role::CarrierDensity => "carrier density",
            Role::Resistance => "resistance",
            Role::ChannelLength => "channel length",
        };
        f.write_str(label)
    }
}

/// Which role is swept, which is stepped between sets and which is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Transfer curves: Vg swept, one set per Vd.
    IdVg,
    /// Output curves: Vd swept, one set per Vg.
    IdVd,
    /// Resistance against carrier density, one set per channel length.
    Tlm,
}

impl Layout {
    pub fn master_independent(self) -> Role {
        match self {
            Layout::IdVg => Role::GateVoltage,
            Layout::IdVd => Role::DrainVoltage,
            Layout::Tlm => Role::CarrierDensity,
        }
    }

    pub fn secondary_independent(self) -> Role {
        match self {
            Layout::IdVg => Role::DrainVoltage,
            Layout::IdVd => Role::GateVoltage,
            Layout::Tlm => Role::ChannelLength,
        }
    }

    pub fn master_dependent(self) -> Role {
        match self {
            Layout::IdVg | Layout::IdVd => Role::DrainCurrent,
            Layout::Tlm => Role::Resistance,
        }
    }

    pub fn roles(self) -> &'static [Role] {
        match self {
            Layout::IdVg | Layout::IdVd => &[
                Role::DrainVoltage,
                Role::DrainCurrent,
                Role::GateVoltage,
                Role::GateCurrent,
                Role::SourceVoltage,
                Role::SourceCurrent,
            ],
            Layout::Tlm => &[Role::CarrierDensity, Role::Resistance, Role::ChannelLength],
        }
    }

    /// Roles whose absence aborts construction.
    pub fn is_required(self, role: Role) -> bool {
        role == self.master_independent() || role == self.master_dependent()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::IdVg => write!(f, "IdVg"),
            Layout::IdVd => write!(f, "IdVd"),
            Layout::Tlm => write!(f, "TLM"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "idvg" => Ok(Layout::IdVg),
            "idvd" => Ok(Layout::IdVd),
            "tlm" => Ok(Layout::Tlm),
            other => Err(format!("unknown layout '{other}' (expected idvg, idvd or tlm)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_key(role.key()), Some(role));
        }
        assert_eq!(Role::from_key("VG"), Some(Role::GateVoltage));
        assert_eq!(Role::from_key("gm"), None);
    }

    #[test]
    fn layouts_include_their_axes() {
        for layout in [Layout::IdVg, Layout::IdVd, Layout::Tlm] {
            let roles = layout.roles();
            assert!(roles.contains(&layout.master_independent()));
            assert!(roles.contains(&layout.secondary_independent()));
            assert!(roles.contains(&layout.master_dependent()));
            assert!(layout.is_required(layout.master_dependent()));
            assert!(!layout.is_required(layout.secondary_independent()));
        }
    }
}
