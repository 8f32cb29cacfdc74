use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;
const JIGGLE: f32 = 1e-3;

/// Unit direction used when two nodes sit on the same spot.
///
/// Swapping `from` and `to` flips the direction, so coincident pairs push apart.
pub(super) fn separation_direction(from: usize, to: usize) -> Vec2 {
    let (low, high, sign) = if from <= to {
        (from, to, 1.0)
    } else {
        (to, from, -1.0)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * sign
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    /// Share of the correction applied to the target; higher-degree endpoints move less.
    pub(super) bias: f32,
}

impl Link {
    pub(super) fn with_degrees(source: usize, target: usize, degrees: &[usize]) -> Self {
        let source_degree = degrees[source] as f32;
        let target_degree = degrees[target] as f32;
        let total = source_degree + target_degree;
        let bias = if total > 0.0 {
            source_degree / total
        } else {
            0.5
        };

        Self {
            source,
            target,
            bias,
        }
    }
}

pub(super) fn apply_links(
    links: &[Link],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    strength: f32,
    alpha: f32,
) {
    for link in links {
        let mut delta = (positions[link.target] + velocities[link.target])
            - (positions[link.source] + velocities[link.source]);
        if delta.length_sq() <= f32::EPSILON {
            delta = separation_direction(link.source, link.target) * JIGGLE;
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * strength);

        velocities[link.target] -= correction * link.bias;
        velocities[link.source] += correction * (1.0 - link.bias);
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) max_distance_sq: f32,
    pub(super) theta: f32,
}

/// Velocity change from a charge of `weight` sitting at `delta` from the node.
fn charge_impulse(delta: Vec2, weight: f32) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < MIN_DISTANCE_SQ {
        distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
    }
    delta * (weight / distance_sq)
}

fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    impulse: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut delta = positions[other_index] - point;
            let distance_sq = delta.length_sq();
            if distance_sq >= params.max_distance_sq {
                continue;
            }
            if distance_sq <= 0.0 {
                delta = separation_direction(other_index, index) * JIGGLE;
            }
            *impulse += charge_impulse(delta, params.strength);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = node.bounds.side_length();
    let can_approximate = !node.bounds.contains(point)
        && (side * side) / (params.theta * params.theta) < distance_sq;

    if can_approximate {
        if distance_sq < params.max_distance_sq {
            *impulse += charge_impulse(delta, params.strength * node.mass);
        }
        return;
    }

    for child in node.children() {
        accumulate_charge(child, index, positions, params, impulse);
    }
}

/// Many-body charge between every pair of nodes within `max_distance`, via Barnes-Hut.
pub(super) fn apply_charge(
    tree: &QuadNode,
    positions: &[Vec2],
    velocities: &mut [Vec2],
    params: ChargeParams,
    alpha: f32,
) {
    for (index, velocity) in velocities.iter_mut().enumerate() {
        let mut impulse = Vec2::ZERO;
        accumulate_charge(tree, index, positions, params, &mut impulse);
        *velocity += impulse * alpha;
    }
}

struct CollisionPass<'a> {
    positions: &'a [Vec2],
    radii: &'a [f32],
    strength: f32,
}

impl CollisionPass<'_> {
    fn resolve(&self, node: &QuadNode, index: usize, point: Vec2, velocities: &mut [Vec2]) {
        let radius = self.radii[index];
        if node.bounds.out_of_reach(point, radius + node.max_radius) {
            return;
        }

        if !node.is_leaf() {
            for child in node.children() {
                self.resolve(child, index, point, velocities);
            }
            return;
        }

        for &other_index in &node.indices {
            // Each pair is resolved once, from its lower index.
            if other_index <= index {
                continue;
            }

            let other_radius = self.radii[other_index];
            let reach = radius + other_radius;
            let mut delta = point - (self.positions[other_index] + velocities[other_index]);
            let mut distance_sq = delta.length_sq();
            if distance_sq >= reach * reach {
                continue;
            }
            if distance_sq <= 0.0 {
                delta = separation_direction(other_index, index) * JIGGLE;
                distance_sq = delta.length_sq();
            }

            let distance = distance_sq.sqrt();
            let push = delta * ((reach - distance) / distance * self.strength);
            let radius_sq = radius * radius;
            let other_radius_sq = other_radius * other_radius;
            let share = if radius_sq + other_radius_sq > 0.0 {
                other_radius_sq / (radius_sq + other_radius_sq)
            } else {
                0.5
            };

            velocities[index] += push * share;
            velocities[other_index] -= push * (1.0 - share);
        }
    }
}

/// One collision sub-iteration over positions predicted one step ahead.
pub(super) fn apply_collision(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    radii: &[f32],
    strength: f32,
) {
    let predicted = positions
        .iter()
        .zip(velocities.iter())
        .map(|(position, velocity)| *position + *velocity)
        .collect::<Vec<_>>();
    let Some(tree) = QuadNode::build(&predicted, radii) else {
        return;
    };

    let pass = CollisionPass {
        positions,
        radii,
        strength,
    };
    for index in 0..positions.len() {
        // Earlier pairs may already have nudged this node's velocity.
        let point = positions[index] + velocities[index];
        pass.resolve(&tree, index, point, velocities);
    }
}

/// Shifts every position so the centroid moves `strength` of the way to the origin.
pub(super) fn apply_centering(positions: &mut [Vec2], strength: f32) {
    if positions.is_empty() {
        return;
    }

    let centroid =
        positions.iter().fold(Vec2::ZERO, |sum, position| sum + *position) / positions.len() as f32;
    let shift = centroid * strength;
    for position in positions {
        *position -= shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge_params() -> ChargeParams {
        ChargeParams {
            strength: -150.0,
            max_distance_sq: 250.0 * 250.0,
            theta: 0.9,
        }
    }

    #[test]
    fn separation_direction_is_antisymmetric_unit() {
        let forward = separation_direction(3, 8);
        let backward = separation_direction(8, 3);
        assert!((forward.length() - 1.0).abs() < 1e-5);
        assert!((forward + backward).length() < 1e-6);
    }

    #[test]
    fn link_pulls_stretched_pair_together() {
        let positions = vec![vec2(0.0, 0.0), vec2(500.0, 0.0)];
        let mut velocities = vec![Vec2::ZERO; 2];
        let links = [Link::with_degrees(0, 1, &[1, 1])];

        apply_links(&links, &positions, &mut velocities, 300.0, 0.3, 1.0);

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
        assert!((velocities[0].x + velocities[1].x).abs() < 1e-4);
    }

    #[test]
    fn link_bias_moves_the_low_degree_end() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let mut velocities = vec![Vec2::ZERO; 2];
        let links = [Link::with_degrees(0, 1, &[9, 1])];

        apply_links(&links, &positions, &mut velocities, 300.0, 0.3, 1.0);

        assert!(velocities[1].x > 0.0);
        assert!(velocities[1].x.abs() > velocities[0].x.abs() * 5.0);
    }

    #[test]
    fn charge_repels_within_range_only() {
        let positions = vec![vec2(0.0, 0.0), vec2(50.0, 0.0), vec2(1000.0, 0.0)];
        let radii = vec![10.0; 3];
        let tree = QuadNode::build(&positions, &radii).expect("finite");
        let mut velocities = vec![Vec2::ZERO; 3];

        apply_charge(&tree, &positions, &mut velocities, charge_params(), 1.0);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[2], Vec2::ZERO);
    }

    #[test]
    fn charge_survives_coincident_nodes() {
        let positions = vec![vec2(10.0, 10.0); 3];
        let radii = vec![10.0; 3];
        let tree = QuadNode::build(&positions, &radii).expect("finite");
        let mut velocities = vec![Vec2::ZERO; 3];

        apply_charge(&tree, &positions, &mut velocities, charge_params(), 0.5);

        assert!(velocities.iter().all(|v| v.x.is_finite() && v.y.is_finite()));
        assert!(velocities.iter().any(|v| v.length() > 0.0));
    }

    #[test]
    fn barnes_hut_matches_direct_sum_for_far_groups() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for index in 0..30 {
            positions.push(vec2(200.0 + (index % 6) as f32, (index / 6) as f32));
        }
        let radii = vec![1.0; positions.len()];
        let tree = QuadNode::build(&positions, &radii).expect("finite");
        let mut velocities = vec![Vec2::ZERO; positions.len()];

        apply_charge(&tree, &positions, &mut velocities, charge_params(), 1.0);

        let exact = positions[1..]
            .iter()
            .fold(Vec2::ZERO, |sum, other| sum + charge_impulse(*other - positions[0], -150.0));
        assert!((velocities[0] - exact).length() < exact.length() * 0.05);
    }

    #[test]
    fn collision_pushes_overlapping_nodes_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(300.0, 0.0)];
        let radii = vec![20.0, 20.0, 20.0];
        let mut velocities = vec![Vec2::ZERO; 3];

        apply_collision(&positions, &mut velocities, &radii, 1.0);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[2], Vec2::ZERO);
        // Equal radii split the correction evenly: (40 - 10) / 2.
        assert!((velocities[1].x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn centering_moves_centroid_toward_origin() {
        let mut positions = vec![vec2(100.0, 0.0), vec2(300.0, 200.0)];

        apply_centering(&mut positions, 0.05);

        let centroid = (positions[0] + positions[1]) / 2.0;
        assert!((centroid - vec2(190.0, 95.0)).length() < 1e-3);
    }
}
