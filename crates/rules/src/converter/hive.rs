//! Lookup tables for RECmd hive types and binary conversions.

use std::fmt;
use std::str::FromStr;

/// Hive a RECmd key description targets.
///
/// Each hive maps onto one of the roots mounted by the generated artifact,
/// plus a glob prefix when the hive is mounted below that root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    Users,
    NtUser,
    System,
    Security,
    Software,
    Sam,
    UsrClass,
    Bcd,
    Amcache,
}

impl Hive {
    pub const ALL: [Hive; 9] = [
        Hive::Users,
        Hive::NtUser,
        Hive::System,
        Hive::Security,
        Hive::Software,
        Hive::Sam,
        Hive::UsrClass,
        Hive::Bcd,
        Hive::Amcache,
    ];

    /// `(Root, Glob prefix)` the hive is mounted at.
    pub fn mount(self) -> (&'static str, &'static str) {
        match self {
            Hive::Users => ("HKEY_USERS", ""),
            // C:\Users\*\NTUSER.DAT is mounted per user.
            Hive::NtUser => ("HKEY_USERS", "*\\"),
            Hive::System => ("HKEY_LOCAL_MACHINE\\System", ""),
            Hive::Security => ("HKEY_LOCAL_MACHINE\\Security", ""),
            Hive::Software => ("HKEY_LOCAL_MACHINE\\Software", ""),
            Hive::Sam => ("SAM", ""),
            // UsrClass.dat lands under each user's Software\Classes.
            Hive::UsrClass => ("HKEY_USERS", "*\\Software\\Classes\\"),
            // BCD lives on the boot partition and is only reachable through the API.
            Hive::Bcd => ("HKEY_LOCAL_MACHINE\\BCD00000000", ""),
            Hive::Amcache => ("Amcache", ""),
        }
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hive::Users => write!(f, "USERS"),
            Hive::NtUser => write!(f, "NTUSER"),
            Hive::System => write!(f, "SYSTEM"),
            Hive::Security => write!(f, "SECURITY"),
            Hive::Software => write!(f, "SOFTWARE"),
            Hive::Sam => write!(f, "SAM"),
            Hive::UsrClass => write!(f, "USRCLASS"),
            Hive::Bcd => write!(f, "BCD"),
            Hive::Amcache => write!(f, "AMCACHE"),
        }
    }
}

impl FromStr for Hive {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USERS" => Ok(Hive::Users),
            "NTUSER" => Ok(Hive::NtUser),
            "SYSTEM" => Ok(Hive::System),
            "SECURITY" => Ok(Hive::Security),
            "SOFTWARE" => Ok(Hive::Software),
            "SAM" => Ok(Hive::Sam),
            "USRCLASS" => Ok(Hive::UsrClass),
            "BCD" => Ok(Hive::Bcd),
            "AMCACHE" => Ok(Hive::Amcache),
            _ => Err(format!("Unknown hive '{}'", s)),
        }
    }
}

/// Decoding RECmd applies to binary values, expressed as a details
/// expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryConvert {
    Epoch,
    Filetime,
    Ip,
}

impl BinaryConvert {
    pub fn details(self) -> &'static str {
        match self {
            BinaryConvert::Epoch => "Epoch(value=Data.Value)",
            BinaryConvert::Filetime => "Filetime(value=Data.Value)",
            BinaryConvert::Ip => "FormatIP(value=Data.Value)",
        }
    }
}

impl FromStr for BinaryConvert {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EPOCH" => Ok(BinaryConvert::Epoch),
            "FILETIME" => Ok(BinaryConvert::Filetime),
            "IP" => Ok(BinaryConvert::Ip),
            _ => Err(format!("Unknown binary conversion {}", s)),
        }
    }
}
