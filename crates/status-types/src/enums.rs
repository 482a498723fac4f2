//! Enumeration types carried by status entities.
//!
//! Every enum serializes to a fixed lowercase wire name and parses from
//! that same name, so query-string filters and JSON documents share a
//! single vocabulary.

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    /// The enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

define_enum! {
    /// The kind of service a [`Resource`](crate::Resource) provides.
    ResourceType {
        /// A public web site.
        Website => "website",
        /// A network-reachable service (API, portal, scheduler).
        Service => "service",
        /// A compute system or partition.
        Compute => "compute",
        /// A supporting system component.
        System => "system",
        /// A storage system or file system.
        Storage => "storage",
        /// A network link or service.
        Network => "network",
        /// The kind is not known.
        Unknown => "unknown",
    }
}

define_enum! {
    /// Operational status of a resource, or the status reported by an event.
    StatusType {
        /// Fully operational.
        Up => "up",
        /// Operating with reduced capability.
        Degraded => "degraded",
        /// Not available.
        Down => "down",
        /// Status not known.
        Unknown => "unknown",
    }
}

define_enum! {
    /// Classification of an [`Incident`](crate::Incident).
    IncidentType {
        /// Scheduled maintenance.
        Planned => "planned",
        /// An outage nobody scheduled.
        Unplanned => "unplanned",
        /// A reservation of resources for a dedicated purpose.
        Reservation => "reservation",
    }
}

define_enum! {
    /// How an [`Incident`](crate::Incident) was, or will be, resolved.
    ResolutionType {
        /// The incident is ongoing.
        Unresolved => "unresolved",
        /// The incident was called off before it started.
        Cancelled => "cancelled",
        /// The incident finished.
        Completed => "completed",
        /// The incident ran past its scheduled end.
        Extended => "extended",
        /// The incident has not started yet.
        Pending => "pending",
    }
}

define_enum! {
    /// Unit in which an allocation is granted and consumed.
    AllocationUnit {
        /// Node hours on a compute resource.
        NodeHours => "node_hours",
        /// Bytes of storage.
        Bytes => "bytes",
        /// File system inodes.
        Inodes => "inodes",
    }
}

impl Default for ResolutionType {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for StatusType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Default for ResourceType {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for ty in ResourceType::ALL {
            assert_eq!(ty.as_str().parse::<ResourceType>(), Ok(*ty));
        }
        for res in ResolutionType::ALL {
            assert_eq!(res.to_string().parse::<ResolutionType>(), Ok(*res));
        }
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = "sideways".parse::<StatusType>().unwrap_err();
        assert_eq!(err.kind, "StatusType");
        assert_eq!(err.value, "sideways");
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&AllocationUnit::NodeHours).unwrap();
        assert_eq!(json, "\"node_hours\"");
        let parsed: IncidentType = serde_json::from_str("\"reservation\"").unwrap();
        assert_eq!(parsed, IncidentType::Reservation);
    }

    #[test]
    fn resolution_defaults_to_pending() {
        assert_eq!(ResolutionType::default(), ResolutionType::Pending);
    }
}
