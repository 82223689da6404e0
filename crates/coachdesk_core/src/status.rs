use crate::model::ApplicationStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

const REGISTRY: [StatusInfo; 7] = [
    StatusInfo {
        key: "applied",
        label: "Applied",
        color: "blue",
    },
    StatusInfo {
        key: "phone-screen",
        label: "Phone Screen",
        color: "cyan",
    },
    StatusInfo {
        key: "first-interview",
        label: "First Interview",
        color: "yellow",
    },
    StatusInfo {
        key: "final-interview",
        label: "Final Interview",
        color: "orange",
    },
    StatusInfo {
        key: "offered",
        label: "Offered",
        color: "purple",
    },
    StatusInfo {
        key: "hired",
        label: "Hired",
        color: "green",
    },
    StatusInfo {
        key: "rejected",
        label: "Rejected",
        color: "red",
    },
];

/// Entry returned for keys the registry does not know, e.g. from older stores.
pub const FALLBACK: StatusInfo = StatusInfo {
    key: "unknown",
    label: "Unknown",
    color: "gray",
};

/// Display metadata for a raw status key. Never fails.
pub fn lookup(key: &str) -> &'static StatusInfo {
    ApplicationStatus::parse(key)
        .map(info)
        .unwrap_or(&FALLBACK)
}

pub fn info(status: ApplicationStatus) -> &'static StatusInfo {
    let index = ApplicationStatus::ALL
        .iter()
        .position(|candidate| *candidate == status)
        .unwrap_or_default();
    &REGISTRY[index]
}

/// Registry entries in pipeline display order.
pub fn pipeline() -> &'static [StatusInfo] {
    &REGISTRY
}
