//! Where everything in the showroom goes.
//!
//! Pure data: the models to load with their transforms, the clone tables of the
//! repeated fixtures, the projector grid, the generated shelf items and the points
//! of interest. [`crate::assembler`] turns it into scene nodes.

use std::f32::consts::PI;

use crate::animation::AnimationBinding;

/// The single baked colour/lighting texture shared by every loaded mesh.
pub const BAKED_TEXTURE: &str = "textures/baked.jpg";

/// Position and Y rotation of one clone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: [f32; 3],
    pub rotation_y: f32,
}

const fn at(x: f32, y: f32, z: f32, rotation_y: f32) -> Placement {
    Placement {
        position: [x, y, z],
        rotation_y,
    }
}

/// Regular rows x columns arrangement. Clone `(row, col)` sits at
/// `origin + (col * x_spacing, 0, -row * z_spacing)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub origin: [f32; 3],
    pub rows: usize,
    pub columns: usize,
    pub x_spacing: f32,
    pub z_spacing: f32,
}

impl Grid {
    pub fn placements(&self, rotation_y: f32) -> Vec<Placement> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |col| (row, col)))
            .map(|(row, col)| Placement {
                position: [
                    self.origin[0] + col as f32 * self.x_spacing,
                    self.origin[1],
                    self.origin[2] - row as f32 * self.z_spacing,
                ],
                rotation_y,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How many copies of a model exist and where.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arrangement {
    /// One copy at the model's own position.
    Single,
    /// One clone per table entry.
    Fixtures(&'static [Placement]),
    Grid(Grid),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelSpec {
    /// Key of the model's root node in the scene.
    pub key: &'static str,
    pub url: &'static str,
    pub scale: f32,
    pub rotation_y: f32,
    /// Absent means the origin.
    pub position: Option<[f32; 3]>,
    pub arrangement: Arrangement,
    pub animations: &'static [AnimationBinding],
}

impl ModelSpec {
    pub const fn single(key: &'static str, url: &'static str) -> Self {
        Self {
            key,
            url,
            scale: 1.0,
            rotation_y: 0.0,
            position: None,
            arrangement: Arrangement::Single,
            animations: &[],
        }
    }

    /// Number of clones the arrangement produces.
    pub fn instance_count(&self) -> usize {
        match self.arrangement {
            Arrangement::Single => 1,
            Arrangement::Fixtures(table) => table.len(),
            Arrangement::Grid(grid) => grid.len(),
        }
    }
}

/// Windows along the back wall and, turned around, along the front wall.
pub const WINDOWS: &[Placement] = &[
    at(-4.5, 1.6, -5.0, 0.0),
    at(-3.5, 1.6, -5.0, 0.0),
    at(-2.5, 1.6, -5.0, 0.0),
    at(-1.5, 1.6, -5.0, 0.0),
    at(-0.5, 1.6, -5.0, 0.0),
    at(0.5, 1.6, -5.0, 0.0),
    at(1.5, 1.6, -5.0, 0.0),
    at(2.5, 1.6, -5.0, 0.0),
    at(3.5, 1.6, -5.0, 0.0),
    at(4.5, 1.6, -5.0, 0.0),
    at(-4.5, 1.6, 5.0, PI),
    at(-3.5, 1.6, 5.0, PI),
    at(-2.5, 1.6, 5.0, PI),
    at(-1.5, 1.6, 5.0, PI),
    at(-0.5, 1.6, 5.0, PI),
    at(0.5, 1.6, 5.0, PI),
    at(1.5, 1.6, 5.0, PI),
    at(2.5, 1.6, 5.0, PI),
    at(3.5, 1.6, 5.0, PI),
    at(4.5, 1.6, 5.0, PI),
];

pub const SHELVES: &[Placement] = &[
    at(-5.4, 0.0, -3.0, PI / 2.0),
    at(-5.4, 0.0, -1.0, PI / 2.0),
    at(-5.4, 0.0, 1.0, PI / 2.0),
];

pub const WORKSTATIONS: &[Placement] = &[at(2.0, 0.0, -2.5, 0.0), at(3.5, 0.0, 2.5, PI)];

pub const MINI_ROBOTS: &[Placement] = &[
    at(-1.0, 0.0, 1.5, 0.0),
    at(0.0, 0.0, 2.0, -PI / 6.0),
    at(1.0, 0.0, 1.5, PI / 6.0),
];

pub const PROJECTOR_GRID: Grid = Grid {
    origin: [-3.75, 3.2, 3.0],
    rows: 3,
    columns: 4,
    x_spacing: 2.5,
    z_spacing: 3.0,
};

/// Every model of the showroom, in load order.
pub const MODELS: &[ModelSpec] = &[
    ModelSpec::single("room", "models/room.glb"),
    ModelSpec {
        arrangement: Arrangement::Fixtures(WINDOWS),
        ..ModelSpec::single("windows", "models/window.glb")
    },
    ModelSpec {
        arrangement: Arrangement::Fixtures(SHELVES),
        ..ModelSpec::single("shelves", "models/shelf.glb")
    },
    ModelSpec {
        arrangement: Arrangement::Fixtures(WORKSTATIONS),
        ..ModelSpec::single("workstations", "models/workstation.glb")
    },
    ModelSpec {
        scale: 0.5,
        arrangement: Arrangement::Grid(PROJECTOR_GRID),
        ..ModelSpec::single("projectors", "models/projector.glb")
    },
    ModelSpec {
        position: Some([-2.0, 0.0, -2.5]),
        rotation_y: PI / 4.0,
        animations: &[AnimationBinding {
            instance: 0,
            clip: 0,
            time_scale: 1.0,
        }],
        ..ModelSpec::single("robot_arm", "models/robot_arm.glb")
    },
    ModelSpec {
        scale: 0.6,
        arrangement: Arrangement::Fixtures(MINI_ROBOTS),
        animations: &[
            AnimationBinding {
                instance: 0,
                clip: 0,
                time_scale: 1.0,
            },
            AnimationBinding {
                instance: 1,
                clip: 1,
                time_scale: 1.0,
            },
            AnimationBinding {
                instance: 2,
                clip: 0,
                time_scale: -1.0,
            },
        ],
        ..ModelSpec::single("mini_robots", "models/mini_robot.glb")
    },
    ModelSpec {
        position: Some([0.0, 0.0, -3.5]),
        animations: &[AnimationBinding {
            instance: 0,
            clip: 0,
            time_scale: -0.5,
        }],
        ..ModelSpec::single("conveyor", "models/conveyor.glb")
    },
];

/// A generated box standing on a shelf.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxItem {
    pub position: [f32; 3],
    pub rotation_y: f32,
    pub size: [f32; 3],
    pub colour: [u8; 4],
}

const fn item(position: [f32; 3], rotation_y: f32, size: [f32; 3], colour: [u8; 4]) -> BoxItem {
    BoxItem {
        position,
        rotation_y,
        size,
        colour,
    }
}

pub const BOX_ITEMS: &[BoxItem] = &[
    item([-5.4, 0.62, -3.3], 0.1, [0.3, 0.24, 0.3], [214, 96, 77, 255]),
    item([-5.4, 0.62, -2.7], -0.2, [0.25, 0.24, 0.4], [233, 196, 106, 255]),
    item([-5.4, 1.22, -3.0], 0.0, [0.4, 0.2, 0.3], [42, 157, 143, 255]),
    item([-5.4, 0.62, -1.2], 0.3, [0.3, 0.3, 0.3], [38, 70, 83, 255]),
    item([-5.4, 1.22, -0.8], -0.1, [0.2, 0.2, 0.5], [244, 162, 97, 255]),
    item([-5.4, 0.62, 0.8], 0.0, [0.35, 0.2, 0.35], [231, 111, 81, 255]),
    item([-5.4, 1.22, 1.2], 0.25, [0.3, 0.25, 0.25], [138, 177, 125, 255]),
];

/// A world position with a page element that follows it on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointOfInterest {
    pub position: [f32; 3],
    pub selector: &'static str,
}

pub const POINTS_OF_INTEREST: &[PointOfInterest] = &[
    PointOfInterest {
        position: [2.0, 1.3, -2.5],
        selector: ".point-0",
    },
    PointOfInterest {
        position: [-2.0, 1.8, -2.5],
        selector: ".point-1",
    },
];
