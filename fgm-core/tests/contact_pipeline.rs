//! End-to-end indentation runs on the layered grid.

use approx::assert_relative_eq;
use fgm_core::assembly::assemble;
use fgm_core::boundary;
use fgm_core::gradient;
use fgm_core::sparse::mul_vec;
use fgm_core::{
    run, Error, LoadWarning, MeshParams, Mesh, Params, SolverKind, StressComponent,
};

fn coarse_params() -> Params {
    let mut params = Params::default();
    params.mesh = MeshParams {
        num_elements_x: 20,
        num_elements_y_fgm: 4,
        num_elements_y_substrate: 10,
    };
    params
}

fn grid(params: &Params) -> Mesh {
    Mesh::layered_grid(&params.geometry, &params.mesh)
}

#[test]
fn test_indenter_force_is_balanced() {
    let params = coarse_params();
    let mesh = grid(&params);
    let solution = run(&mesh, &params).unwrap();

    assert!(solution.has_contact());
    assert!(solution.warnings.is_empty());
    assert!(solution.degenerate_elements.is_empty());
    // Nodes at x = 0.9, 1.0 and 1.1 on the top surface.
    assert_eq!(solution.contact_nodes.len(), 3);
    assert_relative_eq!(
        solution.applied_force_sum(),
        -params.contact.normal_force,
        max_relative = 1e-12
    );
    for &node in &solution.contact_nodes {
        assert_relative_eq!(mesh.nodes()[node][1], 0.6, epsilon = 1e-9);
    }
}

#[test]
fn test_constrained_dofs_do_not_move() {
    let params = coarse_params();
    let mesh = grid(&params);
    let solution = run(&mesh, &params).unwrap();
    let load_case = boundary::assemble(mesh.nodes(), &params.geometry, &params.contact);

    for &dof in &load_case.fixed_dofs {
        assert_eq!(solution.displacements[dof], 0.0, "fixed DOF {} moved", dof);
    }
}

#[test]
fn test_surface_pressed_down_under_indenter() {
    let params = coarse_params();
    let mesh = grid(&params);
    let solution = run(&mesh, &params).unwrap();

    for &node in &solution.contact_nodes {
        let [_, v] = solution.node_displacement(node).unwrap();
        assert!(v < 0.0, "contact node {} moved up by {}", node, v);
    }

    let (_, min_syy) = solution
        .stresses
        .min_component(StressComponent::SigmaYy)
        .unwrap();
    assert!(min_syy < 0.0);
    assert!(solution.stresses.max_von_mises() > 0.0);

    let nodal = solution.stresses.nodal_average(&mesh, StressComponent::SigmaYy);
    assert_eq!(nodal.len(), mesh.n_nodes());
    let under_indenter = solution.contact_nodes[1];
    assert!(nodal[under_indenter] < 0.0);
}

#[test]
fn test_support_reactions_balance_load() {
    let params = coarse_params();
    let mesh = grid(&params);
    let solution = run(&mesh, &params).unwrap();

    // Unconstrained K u gives the applied force on free DOFs and the support
    // reaction on fixed DOFs.
    let materials = gradient::evaluate(mesh.nodes(), &params.material, &params.geometry);
    let system = assemble(&mesh, &materials).unwrap();
    let internal = mul_vec(&system.stiffness, &solution.displacements);
    let load_case = boundary::assemble(mesh.nodes(), &params.geometry, &params.contact);

    let scale = params.contact.normal_force;
    for dof in 0..mesh.n_dofs() {
        if !load_case.fixed_dofs.contains(&dof) {
            assert!(
                (internal[dof] - solution.forces[dof]).abs() < 1e-6 * scale,
                "equilibrium violated at DOF {}",
                dof
            );
        }
    }

    let vertical_reaction: f64 = load_case
        .fixed_dofs
        .iter()
        .filter(|&&dof| dof % 2 == 1)
        .map(|&dof| internal[dof])
        .sum();
    assert_relative_eq!(vertical_reaction, scale, max_relative = 1e-6);
}

#[test]
fn test_dense_and_sparse_solvers_agree() {
    let mut params = Params::default();
    params.mesh = MeshParams {
        num_elements_x: 4,
        num_elements_y_fgm: 1,
        num_elements_y_substrate: 2,
    };
    let mesh = grid(&params);

    params.solver.solver = SolverKind::DenseLu;
    let dense = run(&mesh, &params).unwrap();
    params.solver.solver = SolverKind::Cholesky;
    let sparse = run(&mesh, &params).unwrap();

    assert_eq!(dense.contact_nodes.len(), 1);
    let scale = dense.max_displacement();
    for (a, b) in dense.displacements.iter().zip(&sparse.displacements) {
        assert!((a - b).abs() <= 1e-9 * scale);
    }
}

#[test]
fn test_softer_substrate_increases_deflection() {
    let graded = coarse_params();
    let mut homogeneous = coarse_params();
    homogeneous.material.shear_modulus_substrate = homogeneous.material.shear_modulus_surface;

    let mesh = grid(&graded);
    let graded_solution = run(&mesh, &graded).unwrap();
    let homogeneous_solution = run(&mesh, &homogeneous).unwrap();

    assert!(graded_solution.max_displacement() > homogeneous_solution.max_displacement());
}

#[test]
fn test_missing_contact_is_reported() {
    let mut params = coarse_params();
    // Falls between the top nodes at x = 0.9 and x = 1.0.
    params.contact.contact_region = Some([0.92, 0.98]);
    let mesh = grid(&params);
    let solution = run(&mesh, &params).unwrap();

    assert!(!solution.has_contact());
    assert_eq!(
        solution.warnings,
        vec![LoadWarning::NoContactNodes {
            region: [0.92, 0.98]
        }]
    );
    assert_eq!(solution.applied_force_sum(), 0.0);
    assert_eq!(solution.max_displacement(), 0.0);
}

#[test]
fn test_invalid_connectivity_fails_fast() {
    let params = coarse_params();
    let mesh = grid(&params);
    let mut elements = mesh.elements().to_vec();
    elements.push([0, 1, mesh.n_nodes()]);

    let result = Mesh::from_arrays(mesh.nodes().to_vec(), elements);
    assert!(matches!(result, Err(Error::NodeIndexOutOfBounds { .. })));
}

#[test]
fn test_solution_serializes_to_json() {
    let mut params = coarse_params();
    params.mesh.num_elements_x = 4;
    let mesh = grid(&params);
    let solution = run(&mesh, &params).unwrap();

    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(
        json["displacements"].as_array().unwrap().len(),
        mesh.n_dofs()
    );
    assert_eq!(
        json["stresses"]["stresses"].as_array().unwrap().len(),
        mesh.n_elements()
    );
}
