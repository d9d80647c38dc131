//! Location roles recorded in a room plan.
//!
//! Every role has a static row describing the structure it stands for, the
//! base role it is also recorded under, whether it blocks movement, whether it
//! is a road, and how much room the rampart perimeter must leave around it.

use screeps::constants::StructureType;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocationType {
    Center,
    Exit,
    Harvester,
    HarvesterMineral,
    Upgrader,
    HelperParking,
    BayCenter,
    Road,
    RoadExit,
    RoadSource,
    RoadController,
    RoadMineral,
    Spawn,
    Extension,
    ExtensionHarvester,
    ExtensionBay,
    Link,
    LinkSource,
    LinkController,
    LinkStorage,
    LinkBay,
    Container,
    ContainerSource,
    ContainerController,
    ContainerMineral,
    Storage,
    Terminal,
    Lab,
    Tower,
    Rampart,
    PowerSpawn,
    Nuker,
    Observer,
    Extractor,
    SpawnBlocker,
}

#[derive(Copy, Clone, Debug)]
pub struct LocationInfo {
    pub key: &'static str,
    pub structure: Option<StructureType>,
    pub parent: Option<LocationType>,
    pub obstacle: bool,
    pub road: bool,
    pub protect_radius: Option<u8>,
}

const fn info(
    key: &'static str,
    structure: Option<StructureType>,
    parent: Option<LocationType>,
    obstacle: bool,
    protect_radius: Option<u8>,
) -> LocationInfo {
    LocationInfo {
        key,
        structure,
        parent,
        obstacle,
        road: false,
        protect_radius,
    }
}

const fn road(key: &'static str, parent: Option<LocationType>, protect_radius: Option<u8>) -> LocationInfo {
    LocationInfo {
        key,
        structure: Some(StructureType::Road),
        parent,
        obstacle: false,
        road: true,
        protect_radius,
    }
}

impl LocationType {
    pub const ALL: [LocationType; 35] = [
        LocationType::Center,
        LocationType::Exit,
        LocationType::Harvester,
        LocationType::HarvesterMineral,
        LocationType::Upgrader,
        LocationType::HelperParking,
        LocationType::BayCenter,
        LocationType::Road,
        LocationType::RoadExit,
        LocationType::RoadSource,
        LocationType::RoadController,
        LocationType::RoadMineral,
        LocationType::Spawn,
        LocationType::Extension,
        LocationType::ExtensionHarvester,
        LocationType::ExtensionBay,
        LocationType::Link,
        LocationType::LinkSource,
        LocationType::LinkController,
        LocationType::LinkStorage,
        LocationType::LinkBay,
        LocationType::Container,
        LocationType::ContainerSource,
        LocationType::ContainerController,
        LocationType::ContainerMineral,
        LocationType::Storage,
        LocationType::Terminal,
        LocationType::Lab,
        LocationType::Tower,
        LocationType::Rampart,
        LocationType::PowerSpawn,
        LocationType::Nuker,
        LocationType::Observer,
        LocationType::Extractor,
        LocationType::SpawnBlocker,
    ];

    pub fn info(self) -> LocationInfo {
        use LocationType::*;
        use StructureType as S;

        match self {
            Center => info("center", None, None, false, Some(3)),
            Exit => info("exit", None, None, false, None),
            Harvester => info("harvester", None, None, false, Some(0)),
            HarvesterMineral => info("harvester.mineral", None, None, false, None),
            Upgrader => info("upgrader", None, None, false, Some(0)),
            HelperParking => info("helper_parking", None, None, false, Some(1)),
            BayCenter => info("bay_center", None, None, false, Some(1)),
            Road => road("road", None, None),
            RoadExit => road("road.exit", Some(Road), None),
            RoadSource => road("road.source", Some(Road), Some(0)),
            RoadController => road("road.controller", Some(Road), Some(0)),
            RoadMineral => road("road.mineral", Some(Road), None),
            Spawn => info("spawn", Some(S::Spawn), None, true, Some(2)),
            Extension => info("extension", Some(S::Extension), None, true, None),
            ExtensionHarvester => info("extension.harvester", Some(S::Extension), Some(Extension), true, None),
            ExtensionBay => info("extension.bay", Some(S::Extension), Some(Extension), true, None),
            Link => info("link", Some(S::Link), None, true, Some(1)),
            LinkSource => info("link.source", Some(S::Link), Some(Link), true, Some(1)),
            LinkController => info("link.controller", Some(S::Link), Some(Link), true, Some(1)),
            LinkStorage => info("link.storage", Some(S::Link), Some(Link), true, Some(1)),
            LinkBay => info("link.bay", Some(S::Link), Some(Link), true, Some(1)),
            Container => info("container", Some(S::Container), None, false, None),
            ContainerSource => info("container.source", Some(S::Container), Some(Container), false, None),
            ContainerController => {
                info("container.controller", Some(S::Container), Some(Container), false, None)
            }
            ContainerMineral => info("container.mineral", Some(S::Container), Some(Container), false, None),
            Storage => info("storage", Some(S::Storage), None, true, Some(1)),
            Terminal => info("terminal", Some(S::Terminal), None, true, Some(1)),
            Lab => info("lab", Some(S::Lab), None, true, Some(1)),
            Tower => info("tower", Some(S::Tower), None, true, Some(2)),
            Rampart => info("rampart", Some(S::Rampart), None, false, None),
            PowerSpawn => info("powerSpawn", Some(S::PowerSpawn), None, true, Some(1)),
            Nuker => info("nuker", Some(S::Nuker), None, true, Some(1)),
            Observer => info("observer", Some(S::Observer), None, true, Some(1)),
            Extractor => info("extractor", Some(S::Extractor), None, true, None),
            SpawnBlocker => info("wall.blocker", None, None, true, None),
        }
    }

    #[inline]
    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn from_key(key: &str) -> Option<LocationType> {
        LocationType::ALL.iter().copied().find(|t| t.key() == key)
    }

    #[inline]
    pub fn structure_type(self) -> Option<StructureType> {
        self.info().structure
    }

    #[inline]
    pub fn is_obstacle(self) -> bool {
        self.info().obstacle
    }

    #[inline]
    pub fn is_road(self) -> bool {
        self.info().road
    }

    /// Whether this is the base role for a real structure, the one quotas are counted on.
    pub fn is_quota_label(self) -> bool {
        self.info().parent.is_none() && self.info().structure.is_some()
    }

    /// The base role counted against quotas.
    pub fn base(self) -> LocationType {
        self.info().parent.unwrap_or(self)
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_and_resolve() {
        for location_type in LocationType::ALL {
            assert_eq!(LocationType::from_key(location_type.key()), Some(location_type));
        }
        assert_eq!(LocationType::from_key("road.nowhere"), None);
    }

    #[test]
    fn sub_roles_share_the_parent_structure() {
        for location_type in LocationType::ALL {
            let base = location_type.base();
            assert!(base.info().parent.is_none());
            if base != location_type {
                assert_eq!(base.structure_type(), location_type.structure_type());
                assert!(location_type.key().starts_with(base.key()));
            }
        }
        assert!(LocationType::Extension.is_quota_label());
        assert!(!LocationType::ExtensionBay.is_quota_label());
        assert!(!LocationType::Center.is_quota_label());
    }
}
