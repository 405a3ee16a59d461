// crates/ef_physics/tests/parallel_consistency.rs
//!
//! 并行策略一致性测试
//!
//! 所有策略在舍入误差内与串行遍历一致，着色有效且覆盖全部边

use ef_config::{DissipationConfig, ParallelConfig, ParallelStrategy};
use ef_mesh::{EdgeColoring, EdgeMesh, RectMeshGenerator};
use ef_physics::{
    DissipationAccumulator, DissipationCalculator, FlowField, FlowState, GeometryProvider, PerfectGas,
};

fn pulse_field(gas: &PerfectGas, mesh: &EdgeMesh) -> FlowField {
    let state = FlowState::from_fn(mesh.n_nodes(), |i| {
        let p = mesh.nodes()[i];
        let r2 = (p.x - 0.4).powi(2) + (p.y - 0.6).powi(2);
        let bump = (-r2 / 0.02).exp();
        gas.conservative_from_primitive(1.2 * (1.0 + 0.1 * bump), 120.0, 15.0, 1.0e5 * (1.0 + 0.2 * bump))
    });
    let dependent = gas.update_dependent(&state);
    FlowField::new(state, dependent).unwrap()
}

fn run(
    mesh: &EdgeMesh,
    field: &FlowField,
    dissipation: &DissipationConfig,
    strategy: ParallelStrategy,
    min_parallel_size: usize,
) -> (DissipationAccumulator, DissipationCalculator) {
    let parallel = ParallelConfig {
        strategy,
        min_parallel_size,
    };
    let mut calc = DissipationCalculator::from_config(dissipation, &parallel).unwrap();
    let mut acc = DissipationAccumulator::new(mesh.n_nodes());
    calc.compute(mesh, field, &mut acc).unwrap();
    (acc, calc)
}

#[test]
fn test_all_strategies_match_sequential() {
    let gas = PerfectGas::default();
    let mesh = RectMeshGenerator::new(40, 30, 2.0, 1.5).build().unwrap();
    let field = pulse_field(&gas, &mesh);

    for dissipation in [DissipationConfig::default(), DissipationConfig::preconditioned(1.0, 0.3)] {
        let (reference, _) = run(&mesh, &field, &dissipation, ParallelStrategy::Sequential, 0);
        let scale = reference.max_abs();
        assert!(scale > 0.0);

        for strategy in [
            ParallelStrategy::Colored,
            ParallelStrategy::PrivateReduce,
            ParallelStrategy::Atomic,
            ParallelStrategy::Auto,
        ] {
            let (acc, calc) = run(&mesh, &field, &dissipation, strategy, 100);
            assert_eq!(calc.metrics().total_edges, mesh.n_edges());
            for i in 0..mesh.n_nodes() {
                let a = acc.get(i);
                let b = reference.get(i);
                assert!((a.dens - b.dens).abs() < 1e-12 * scale, "{:?} node {}", strategy, i);
                assert!((a.xmom - b.xmom).abs() < 1e-12 * scale, "{:?} node {}", strategy, i);
                assert!((a.ymom - b.ymom).abs() < 1e-12 * scale, "{:?} node {}", strategy, i);
                assert!((a.ener - b.ener).abs() < 1e-12 * scale, "{:?} node {}", strategy, i);
            }
        }
    }
}

#[test]
fn test_auto_small_mesh_is_sequential() {
    let gas = PerfectGas::default();
    let mesh = RectMeshGenerator::square(4, 1.0).build().unwrap();
    let field = pulse_field(&gas, &mesh);

    let (_, calc) = run(&mesh, &field, &DissipationConfig::default(), ParallelStrategy::Auto, 10_000);
    assert_eq!(calc.metrics().sequential_calls, 1);
    assert_eq!(calc.metrics().parallel_calls, 0);
}

#[test]
fn test_colored_recolors_new_mesh() {
    let gas = PerfectGas::default();
    let small = RectMeshGenerator::square(3, 1.0).build().unwrap();
    let large = RectMeshGenerator::square(9, 1.0).build().unwrap();

    let parallel = ParallelConfig {
        strategy: ParallelStrategy::Colored,
        min_parallel_size: 0,
    };
    let mut calc = DissipationCalculator::from_config(&DissipationConfig::default(), &parallel).unwrap();
    calc.setup_coloring(&small);

    let field = pulse_field(&gas, &large);
    let mut acc = DissipationAccumulator::new(large.n_nodes());
    calc.compute(&large, &field, &mut acc).unwrap();

    let coloring = calc.coloring().unwrap();
    assert_eq!(coloring.edge_colors.len(), large.n_edges());
    assert!(coloring.is_valid(&large));
}

#[test]
fn test_coloring_validity() {
    for (nx, ny) in [(1, 1), (5, 3), (16, 16)] {
        let mesh = RectMeshGenerator::new(nx, ny, 1.0, 1.0).build().unwrap();
        let coloring = EdgeColoring::color(&mesh);

        assert!(coloring.is_valid(&mesh));
        assert_eq!(coloring.color_sizes.iter().sum::<usize>(), mesh.n_edges());

        // 贪心着色的颜色数不超过 2Δ-1
        let max_degree = mesh.node_degrees().into_iter().max().unwrap_or(0);
        assert!(coloring.num_colors <= 2 * max_degree - 1);
        assert!(coloring.num_colors >= max_degree);
    }
}
