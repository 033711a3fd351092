use spacetruss::Truss;
use std::fmt::Write;

/// Render a textual summary of a solved truss.
///
/// Members are listed with their axial force and stress, supports with their
/// reaction, followed by the total reaction so the reader can check it against
/// the applied loads.
#[must_use]
pub fn render_summary(truss: &Truss) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "{} truss: {} joints, {} members, {} dofs",
        truss.dimension(),
        truss.joint_count(),
        truss.member_count(),
        truss.dof_count()
    )
    .expect("writing to string cannot fail");

    let Some(result) = truss.result() else {
        output.push_str("No analysis results available\n");
        return output;
    };

    if let Some((joint, displacement)) = result.max_displacement() {
        writeln!(
            &mut output,
            "Max displacement at joint {joint}: ux = {:+.3e}, uy = {:+.3e}, uz = {:+.3e}",
            displacement.x, displacement.y, displacement.z
        )
        .expect("writing to string cannot fail");
    }

    output.push_str("Member forces (tension positive):\n");
    for (member, force) in result.internal_forces() {
        let stress = truss.member_stress(member).unwrap_or(0.0);
        writeln!(
            &mut output,
            "  member {member:>4}: force = {force:+.4e}, stress = {stress:+.4e}"
        )
        .expect("writing to string cannot fail");
    }

    output.push_str("Support reactions:\n");
    for (joint, reaction) in result.reactions() {
        writeln!(
            &mut output,
            "  joint {joint:>5}: ({:+.4e}, {:+.4e}, {:+.4e})",
            reaction.x, reaction.y, reaction.z
        )
        .expect("writing to string cannot fail");
    }

    let total = result.total_reaction();
    writeln!(
        &mut output,
        "Total reaction: ({:+.4e}, {:+.4e}, {:+.4e})",
        total.x, total.y, total.z
    )
    .expect("writing to string cannot fail");
    writeln!(&mut output, "Structure weight: {:.4e}", truss.weight())
        .expect("writing to string cannot fail");

    output
}
