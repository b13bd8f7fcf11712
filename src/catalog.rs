//! Static per-kind data: footprints, costs, power, crop specs and the leveled
//! throughput tables. Everything here is resolved through
//! [`EntityKind::descriptor`] and never re-parsed at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wheat,
    Carrot,
    Corn,
    Tomato,
    Apple,
    Orange,
    Egg,
    Milk,
    Wool,
    WaterBucket,
    Plank,
    Stone,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Wheat,
        ResourceKind::Carrot,
        ResourceKind::Corn,
        ResourceKind::Tomato,
        ResourceKind::Apple,
        ResourceKind::Orange,
        ResourceKind::Egg,
        ResourceKind::Milk,
        ResourceKind::Wool,
        ResourceKind::WaterBucket,
        ResourceKind::Plank,
        ResourceKind::Stone,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Wheat => "wheat",
            ResourceKind::Carrot => "carrot",
            ResourceKind::Corn => "corn",
            ResourceKind::Tomato => "tomato",
            ResourceKind::Apple => "apple",
            ResourceKind::Orange => "orange",
            ResourceKind::Egg => "egg",
            ResourceKind::Milk => "milk",
            ResourceKind::Wool => "wool",
            ResourceKind::WaterBucket => "water_bucket",
            ResourceKind::Plank => "plank",
            ResourceKind::Stone => "stone",
        }
    }

    /// Coins paid per unit when sold.
    pub fn sell_price(self) -> u64 {
        match self {
            ResourceKind::Wheat => 3,
            ResourceKind::Carrot => 5,
            ResourceKind::Corn => 7,
            ResourceKind::Tomato => 9,
            ResourceKind::Apple => 12,
            ResourceKind::Orange => 15,
            ResourceKind::Egg => 4,
            ResourceKind::Milk => 8,
            ResourceKind::Wool => 12,
            ResourceKind::WaterBucket => 1,
            ResourceKind::Plank => 6,
            ResourceKind::Stone => 6,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Plot,
    Crop,
    Tree,
    Building,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Plot,
    Wheat,
    Carrot,
    Corn,
    Tomato,
    AppleTree,
    OrangeTree,
    Farmhouse,
    House,
    Barn,
    Coop,
    CowShed,
    SheepPen,
    Well,
    Sawmill,
    Quarry,
    WindTurbine,
    SolarPanel,
    Fence,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Plot => "plot",
            EntityKind::Wheat => "wheat",
            EntityKind::Carrot => "carrot",
            EntityKind::Corn => "corn",
            EntityKind::Tomato => "tomato",
            EntityKind::AppleTree => "apple_tree",
            EntityKind::OrangeTree => "orange_tree",
            EntityKind::Farmhouse => "farmhouse",
            EntityKind::House => "house",
            EntityKind::Barn => "barn",
            EntityKind::Coop => "coop",
            EntityKind::CowShed => "cow_shed",
            EntityKind::SheepPen => "sheep_pen",
            EntityKind::Well => "well",
            EntityKind::Sawmill => "sawmill",
            EntityKind::Quarry => "quarry",
            EntityKind::WindTurbine => "wind_turbine",
            EntityKind::SolarPanel => "solar_panel",
            EntityKind::Fence => "fence",
        }
    }

    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            EntityKind::Plot => &PLOT,
            EntityKind::Wheat => &WHEAT,
            EntityKind::Carrot => &CARROT,
            EntityKind::Corn => &CORN,
            EntityKind::Tomato => &TOMATO,
            EntityKind::AppleTree => &APPLE_TREE,
            EntityKind::OrangeTree => &ORANGE_TREE,
            EntityKind::Farmhouse => &FARMHOUSE,
            EntityKind::House => &HOUSE,
            EntityKind::Barn => &BARN,
            EntityKind::Coop => &COOP,
            EntityKind::CowShed => &COW_SHED,
            EntityKind::SheepPen => &SHEEP_PEN,
            EntityKind::Well => &WELL,
            EntityKind::Sawmill => &SAWMILL,
            EntityKind::Quarry => &QUARRY,
            EntityKind::WindTurbine => &WIND_TURBINE,
            EntityKind::SolarPanel => &SOLAR_PANEL,
            EntityKind::Fence => &FENCE,
        }
    }

    pub fn category(self) -> Category {
        self.descriptor().category
    }

    pub fn crop_spec(self) -> Option<&'static CropSpec> {
        match &self.descriptor().role {
            Role::Crop(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn is_house(self) -> bool {
        matches!(self.descriptor().role, Role::House)
    }

    pub fn is_storage(self) -> bool {
        matches!(self.descriptor().role, Role::Storage(_))
    }

    /// Highest level this kind can reach. Kinds without a level table stay at 1.
    pub fn max_level(self) -> u8 {
        let rows = match &self.descriptor().role {
            Role::Production { tiers, .. } => tiers.len(),
            Role::Storage(tiers) => tiers.len(),
            Role::Residence(tiers) => tiers.len(),
            _ => 1,
        };
        rows.max(1) as u8
    }

    /// Cost of moving from `level - 1` to `level`, read from the target row.
    pub fn upgrade_step(self, level: u8) -> Option<&'static UpgradeStep> {
        let index = usize::from(level).checked_sub(1)?;
        match &self.descriptor().role {
            Role::Production { tiers, .. } => tiers.get(index).map(|t| &t.upgrade),
            Role::Storage(tiers) => tiers.get(index).map(|t| &t.upgrade),
            Role::Residence(tiers) => tiers.get(index).map(|t| &t.upgrade),
            _ => None,
        }
    }

    /// Throughput row for a production building; `None` for unknown levels or
    /// kinds that do not produce.
    pub fn production(self, level: u8) -> Option<(ResourceKind, &'static ProductionTier)> {
        let index = usize::from(level).checked_sub(1)?;
        match &self.descriptor().role {
            Role::Production { resource, tiers } => tiers.get(index).map(|t| (*resource, t)),
            _ => None,
        }
    }

    pub fn storage_capacity(self, level: u8) -> u32 {
        let Some(index) = usize::from(level).checked_sub(1) else {
            return 0;
        };
        match &self.descriptor().role {
            Role::Storage(tiers) => tiers.get(index).map(|t| t.capacity).unwrap_or(0),
            _ => 0,
        }
    }

    pub fn growth_multiplier(self, level: u8) -> Option<f64> {
        let index = usize::from(level).checked_sub(1)?;
        match &self.descriptor().role {
            Role::Residence(tiers) => tiers.get(index).map(|t| t.growth_multiplier),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct KindDescriptor {
    pub category: Category,
    pub width: u8,
    pub depth: u8,
    pub build_cost: u64,
    /// Positive generates, negative consumes.
    pub power: i32,
    pub role: Role,
}

#[derive(Debug)]
pub enum Role {
    Inert,
    House,
    Storage(&'static [StorageTier]),
    Residence(&'static [ResidenceTier]),
    Production {
        resource: ResourceKind,
        tiers: &'static [ProductionTier],
    },
    Crop(CropSpec),
}

#[derive(Debug)]
pub struct UpgradeStep {
    pub cost: u64,
    pub requirements: &'static [(ResourceKind, u32)],
}

#[derive(Debug)]
pub struct ProductionTier {
    pub output_amount: u32,
    pub cycle_ms: u64,
    pub upgrade: UpgradeStep,
}

#[derive(Debug)]
pub struct StorageTier {
    pub capacity: u32,
    pub upgrade: UpgradeStep,
}

#[derive(Debug)]
pub struct ResidenceTier {
    pub growth_multiplier: f64,
    pub upgrade: UpgradeStep,
}

#[derive(Debug)]
pub struct CropSpec {
    pub resource: ResourceKind,
    pub growth_ms: u64,
    pub water_required: u8,
    pub yield_min: u32,
    pub yield_max: u32,
    /// Trees regrow after harvest instead of being removed.
    pub perennial: bool,
}

const FREE: UpgradeStep = UpgradeStep {
    cost: 0,
    requirements: &[],
};

const fn kind(
    category: Category,
    width: u8,
    depth: u8,
    build_cost: u64,
    power: i32,
    role: Role,
) -> KindDescriptor {
    KindDescriptor {
        category,
        width,
        depth,
        build_cost,
        power,
        role,
    }
}

const fn crop(
    resource: ResourceKind,
    growth_ms: u64,
    water_required: u8,
    yield_min: u32,
    yield_max: u32,
    perennial: bool,
) -> Role {
    Role::Crop(CropSpec {
        resource,
        growth_ms,
        water_required,
        yield_min,
        yield_max,
        perennial,
    })
}

static PLOT: KindDescriptor = kind(Category::Plot, 1, 1, 10, 0, Role::Inert);
static WHEAT: KindDescriptor = kind(
    Category::Crop,
    1,
    1,
    5,
    0,
    crop(ResourceKind::Wheat, 60_000, 3, 2, 4, false),
);
static CARROT: KindDescriptor = kind(
    Category::Crop,
    1,
    1,
    8,
    0,
    crop(ResourceKind::Carrot, 120_000, 3, 2, 5, false),
);
static CORN: KindDescriptor = kind(
    Category::Crop,
    1,
    1,
    12,
    0,
    crop(ResourceKind::Corn, 180_000, 3, 3, 6, false),
);
static TOMATO: KindDescriptor = kind(
    Category::Crop,
    1,
    1,
    15,
    0,
    crop(ResourceKind::Tomato, 240_000, 3, 3, 7, false),
);
static APPLE_TREE: KindDescriptor = kind(
    Category::Tree,
    1,
    1,
    60,
    0,
    crop(ResourceKind::Apple, 600_000, 2, 3, 6, true),
);
static ORANGE_TREE: KindDescriptor = kind(
    Category::Tree,
    1,
    1,
    80,
    0,
    crop(ResourceKind::Orange, 900_000, 2, 4, 8, true),
);

static FARMHOUSE_TIERS: [ResidenceTier; 6] = [
    ResidenceTier {
        growth_multiplier: 1.0,
        upgrade: FREE,
    },
    ResidenceTier {
        growth_multiplier: 1.1,
        upgrade: UpgradeStep {
            cost: 500,
            requirements: &[(ResourceKind::Wheat, 20)],
        },
    },
    ResidenceTier {
        growth_multiplier: 1.2,
        upgrade: UpgradeStep {
            cost: 1_200,
            requirements: &[(ResourceKind::Plank, 20), (ResourceKind::Stone, 10)],
        },
    },
    ResidenceTier {
        growth_multiplier: 1.35,
        upgrade: UpgradeStep {
            cost: 2_500,
            requirements: &[
                (ResourceKind::Plank, 40),
                (ResourceKind::Stone, 25),
                (ResourceKind::Milk, 10),
            ],
        },
    },
    ResidenceTier {
        growth_multiplier: 1.5,
        upgrade: UpgradeStep {
            cost: 5_000,
            requirements: &[
                (ResourceKind::Plank, 60),
                (ResourceKind::Stone, 40),
                (ResourceKind::Wool, 15),
            ],
        },
    },
    ResidenceTier {
        growth_multiplier: 1.75,
        upgrade: UpgradeStep {
            cost: 9_000,
            requirements: &[
                (ResourceKind::Plank, 90),
                (ResourceKind::Stone, 60),
                (ResourceKind::Egg, 50),
            ],
        },
    },
];
static FARMHOUSE: KindDescriptor = kind(
    Category::Building,
    3,
    3,
    0,
    0,
    Role::Residence(&FARMHOUSE_TIERS),
);

static HOUSE: KindDescriptor = kind(Category::Building, 2, 2, 200, 0, Role::House);

static BARN_TIERS: [StorageTier; 4] = [
    StorageTier {
        capacity: 100,
        upgrade: FREE,
    },
    StorageTier {
        capacity: 150,
        upgrade: UpgradeStep {
            cost: 250,
            requirements: &[(ResourceKind::Plank, 10)],
        },
    },
    StorageTier {
        capacity: 225,
        upgrade: UpgradeStep {
            cost: 600,
            requirements: &[(ResourceKind::Plank, 20), (ResourceKind::Stone, 10)],
        },
    },
    StorageTier {
        capacity: 325,
        upgrade: UpgradeStep {
            cost: 1_200,
            requirements: &[(ResourceKind::Plank, 30), (ResourceKind::Stone, 25)],
        },
    },
];
static BARN: KindDescriptor = kind(Category::Building, 3, 2, 250, 0, Role::Storage(&BARN_TIERS));

static COOP_TIERS: [ProductionTier; 3] = [
    ProductionTier {
        output_amount: 10,
        cycle_ms: 600_000,
        upgrade: FREE,
    },
    ProductionTier {
        output_amount: 15,
        cycle_ms: 540_000,
        upgrade: UpgradeStep {
            cost: 300,
            requirements: &[(ResourceKind::Plank, 10)],
        },
    },
    ProductionTier {
        output_amount: 22,
        cycle_ms: 480_000,
        upgrade: UpgradeStep {
            cost: 800,
            requirements: &[(ResourceKind::Plank, 20), (ResourceKind::Stone, 10)],
        },
    },
];
static COOP: KindDescriptor = kind(
    Category::Building,
    2,
    2,
    150,
    0,
    Role::Production {
        resource: ResourceKind::Egg,
        tiers: &COOP_TIERS,
    },
);

static COW_SHED_TIERS: [ProductionTier; 3] = [
    ProductionTier {
        output_amount: 6,
        cycle_ms: 900_000,
        upgrade: FREE,
    },
    ProductionTier {
        output_amount: 9,
        cycle_ms: 800_000,
        upgrade: UpgradeStep {
            cost: 450,
            requirements: &[(ResourceKind::Plank, 15)],
        },
    },
    ProductionTier {
        output_amount: 13,
        cycle_ms: 720_000,
        upgrade: UpgradeStep {
            cost: 1_000,
            requirements: &[(ResourceKind::Plank, 25), (ResourceKind::Stone, 15)],
        },
    },
];
static COW_SHED: KindDescriptor = kind(
    Category::Building,
    3,
    2,
    300,
    0,
    Role::Production {
        resource: ResourceKind::Milk,
        tiers: &COW_SHED_TIERS,
    },
);

static SHEEP_PEN_TIERS: [ProductionTier; 2] = [
    ProductionTier {
        output_amount: 4,
        cycle_ms: 1_200_000,
        upgrade: FREE,
    },
    ProductionTier {
        output_amount: 6,
        cycle_ms: 1_080_000,
        upgrade: UpgradeStep {
            cost: 500,
            requirements: &[(ResourceKind::Plank, 15)],
        },
    },
];
static SHEEP_PEN: KindDescriptor = kind(
    Category::Building,
    3,
    3,
    350,
    0,
    Role::Production {
        resource: ResourceKind::Wool,
        tiers: &SHEEP_PEN_TIERS,
    },
);

static WELL_TIERS: [ProductionTier; 3] = [
    ProductionTier {
        output_amount: 5,
        cycle_ms: 120_000,
        upgrade: FREE,
    },
    ProductionTier {
        output_amount: 8,
        cycle_ms: 100_000,
        upgrade: UpgradeStep {
            cost: 150,
            requirements: &[(ResourceKind::Stone, 5)],
        },
    },
    ProductionTier {
        output_amount: 12,
        cycle_ms: 90_000,
        upgrade: UpgradeStep {
            cost: 400,
            requirements: &[(ResourceKind::Stone, 12)],
        },
    },
];
static WELL: KindDescriptor = kind(
    Category::Building,
    1,
    1,
    80,
    0,
    Role::Production {
        resource: ResourceKind::WaterBucket,
        tiers: &WELL_TIERS,
    },
);

static SAWMILL_TIERS: [ProductionTier; 2] = [
    ProductionTier {
        output_amount: 4,
        cycle_ms: 300_000,
        upgrade: FREE,
    },
    ProductionTier {
        output_amount: 6,
        cycle_ms: 270_000,
        upgrade: UpgradeStep {
            cost: 400,
            requirements: &[(ResourceKind::Stone, 10)],
        },
    },
];
static SAWMILL: KindDescriptor = kind(
    Category::Building,
    3,
    2,
    400,
    -3,
    Role::Production {
        resource: ResourceKind::Plank,
        tiers: &SAWMILL_TIERS,
    },
);

static QUARRY_TIERS: [ProductionTier; 2] = [
    ProductionTier {
        output_amount: 3,
        cycle_ms: 360_000,
        upgrade: FREE,
    },
    ProductionTier {
        output_amount: 5,
        cycle_ms: 330_000,
        upgrade: UpgradeStep {
            cost: 450,
            requirements: &[(ResourceKind::Plank, 12)],
        },
    },
];
static QUARRY: KindDescriptor = kind(
    Category::Building,
    3,
    3,
    450,
    -4,
    Role::Production {
        resource: ResourceKind::Stone,
        tiers: &QUARRY_TIERS,
    },
);

static WIND_TURBINE: KindDescriptor = kind(Category::Building, 1, 1, 300, 5, Role::Inert);
static SOLAR_PANEL: KindDescriptor = kind(Category::Building, 2, 1, 220, 3, Role::Inert);
static FENCE: KindDescriptor = kind(Category::Building, 1, 1, 5, 0, Role::Inert);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coop_first_tier_matches_reference_numbers() {
        let (resource, tier) = EntityKind::Coop.production(1).unwrap();
        assert_eq!(resource, ResourceKind::Egg);
        assert_eq!(tier.output_amount, 10);
        assert_eq!(tier.cycle_ms, 600_000);
    }

    #[test]
    fn unknown_levels_resolve_to_nothing() {
        assert!(EntityKind::Coop.production(0).is_none());
        assert!(EntityKind::Coop.production(9).is_none());
        assert!(EntityKind::Fence.upgrade_step(2).is_none());
        assert_eq!(EntityKind::Barn.storage_capacity(0), 0);
    }

    #[test]
    fn residence_table_is_the_longest() {
        let residence = EntityKind::Farmhouse.max_level();
        for kind in [EntityKind::Coop, EntityKind::Barn, EntityKind::Well] {
            assert!(residence > kind.max_level());
        }
        assert_eq!(EntityKind::House.max_level(), 1);
    }

    #[test]
    fn crop_specs_have_sane_yield_ranges() {
        for kind in [
            EntityKind::Wheat,
            EntityKind::Carrot,
            EntityKind::Corn,
            EntityKind::Tomato,
            EntityKind::AppleTree,
            EntityKind::OrangeTree,
        ] {
            let spec = kind.crop_spec().expect("crop kinds carry a spec");
            assert!(spec.yield_min <= spec.yield_max, "{kind}");
            assert!(spec.growth_ms > 0);
        }
        assert!(EntityKind::Wheat.crop_spec().map(|s| !s.perennial).unwrap());
        assert!(EntityKind::AppleTree.crop_spec().map(|s| s.perennial).unwrap());
    }
}
