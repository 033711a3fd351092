#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use spacetruss::{
    force, point, Dimension, Force, LinearSolver, MemberType, SolverOptions, SupportType, Truss,
};

const APEX: usize = 4;

fn build_pyramid(options: SolverOptions) -> Truss {
    let mut truss = Truss::with_options(Dimension::Three, options);
    let anchors = [
        point(0.0, 0.0, 0.0),
        point(36.0, 0.0, 0.0),
        point(36.0, 18.0, 0.0),
        point(0.0, 20.0, 0.0),
    ];
    for (id, position) in anchors.into_iter().enumerate() {
        truss
            .add_joint(id, position, SupportType::Pin)
            .expect("anchor joint accepted");
    }
    truss
        .add_joint(APEX, point(12.0, 10.0, 18.0), SupportType::Free)
        .expect("apex joint accepted");
    let member_type = MemberType::new(1.0, 1.0e7, 1.0);
    for id in 0..4 {
        truss
            .add_member(id, id, APEX, member_type)
            .expect("member accepted");
    }
    truss
}

fn loaded_pyramid(options: SolverOptions) -> Truss {
    let mut truss = build_pyramid(options);
    truss
        .add_external_force(APEX, force(0.0, -10_000.0, 0.0))
        .expect("load applied");
    truss
}

#[test]
fn only_the_apex_moves() {
    let mut truss = loaded_pyramid(SolverOptions::default());
    let result = truss.solve().expect("pyramid is stable");

    let apex = result.displacement(APEX).expect("apex displacement");
    assert!(apex.magnitude() > 0.0);
    assert!(apex.y < 0.0);
    for anchor in 0..4 {
        let displacement = result.displacement(anchor).expect("anchor displacement");
        assert_eq!(displacement.magnitude(), 0.0);
    }
}

#[test]
fn reactions_balance_the_downward_load() {
    let mut truss = loaded_pyramid(SolverOptions::default());
    let result = truss.solve().expect("pyramid is stable");

    let total = result.total_reaction();
    assert_relative_eq!(total.x, 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(total.y, 10_000.0, epsilon = 1.0e-6);
    assert_relative_eq!(total.z, 0.0, epsilon = 1.0e-6);
    assert_eq!(result.reactions().count(), 4);
    assert_eq!(result.reaction(APEX), None);
}

#[test]
fn member_forces_satisfy_apex_equilibrium() {
    let mut truss = loaded_pyramid(SolverOptions::default());
    let result = truss.solve().expect("pyramid is stable");

    // Each member pulls the apex towards its anchor when in tension.
    let apex = point(12.0, 10.0, 18.0).to_vector();
    let mut resultant = force(0.0, -10_000.0, 0.0).to_vector();
    for member in truss.members() {
        let anchor = truss
            .joint(member.start)
            .expect("anchor exists")
            .position
            .to_vector();
        let towards_anchor = (anchor - apex).normalize();
        let axial = result.internal_force(member.id).expect("member force");
        resultant += towards_anchor * axial;
    }
    assert_relative_eq!(resultant.norm(), 0.0, epsilon = 1.0e-6);
}

#[test]
fn reaction_matches_member_force_at_each_anchor() {
    let mut truss = loaded_pyramid(SolverOptions::default());
    let result = truss.solve().expect("pyramid is stable");

    let apex = point(12.0, 10.0, 18.0).to_vector();
    for member in truss.members() {
        let anchor = truss
            .joint(member.start)
            .expect("anchor exists")
            .position
            .to_vector();
        let axial = result.internal_force(member.id).expect("member force");
        // A tension member pulls the anchor towards the apex; the support pushes back.
        let expected = Force::from((anchor - apex).normalize() * axial);
        let reaction = result.reaction(member.start).expect("anchor reaction");
        assert_relative_eq!(reaction.x, expected.x, epsilon = 1.0e-6);
        assert_relative_eq!(reaction.y, expected.y, epsilon = 1.0e-6);
        assert_relative_eq!(reaction.z, expected.z, epsilon = 1.0e-6);
    }
}

#[test]
fn cholesky_and_lu_agree() {
    let mut cholesky = loaded_pyramid(SolverOptions::default());
    let mut lu = loaded_pyramid(SolverOptions::default().with_linear_solver(LinearSolver::Lu));
    let a = cholesky.solve().expect("cholesky solve");
    let b = lu.solve().expect("lu solve");

    let da = a.displacement(APEX).expect("apex").to_vector();
    let db = b.displacement(APEX).expect("apex").to_vector();
    assert_relative_eq!(da, db, max_relative = 1.0e-9);
    for member in 0..4 {
        assert_relative_eq!(
            a.internal_force(member).expect("force"),
            b.internal_force(member).expect("force"),
            max_relative = 1.0e-9
        );
    }
}

#[test]
fn superposition_holds() {
    let first = force(0.0, -10_000.0, 0.0);
    let second = force(2_500.0, 1_000.0, -4_000.0);

    let mut truss = build_pyramid(SolverOptions::default());
    truss.add_external_force(APEX, first).expect("load");
    let only_first = truss.solve().expect("first solve");

    truss.clear_external_forces();
    truss.add_external_force(APEX, second).expect("load");
    let only_second = truss.solve().expect("second solve");

    truss.add_external_force(APEX, first).expect("load");
    let combined = truss.solve().expect("combined solve");

    let sum = only_first.displacement(APEX).expect("apex").to_vector()
        + only_second.displacement(APEX).expect("apex").to_vector();
    let both = combined.displacement(APEX).expect("apex").to_vector();
    assert_relative_eq!(sum, both, max_relative = 1.0e-9);

    for member in 0..4 {
        let sum = only_first.internal_force(member).expect("force")
            + only_second.internal_force(member).expect("force");
        assert_relative_eq!(
            sum,
            combined.internal_force(member).expect("force"),
            epsilon = 1.0e-6
        );
    }
}

#[test]
fn independent_models_solve_in_parallel() {
    let loads = [-10_000.0, -5_000.0, 2_000.0, 7_500.0];
    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = loads
            .iter()
            .map(|load| {
                scope.spawn(move || {
                    let mut truss = build_pyramid(SolverOptions::default());
                    truss
                        .add_external_force(APEX, force(0.0, *load, 0.0))
                        .expect("load");
                    let result = truss.solve().expect("stable");
                    result.displacement(APEX).expect("apex").y
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("solver thread"))
            .collect()
    });

    // Linear response: displacement is proportional to load.
    let per_unit = results[0] / loads[0];
    for (displacement, load) in results.iter().zip(loads) {
        assert_relative_eq!(*displacement, per_unit * load, max_relative = 1.0e-9);
    }
}
