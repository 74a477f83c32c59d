use std::num::NonZeroU32;

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;
use vqe_core::{
    atom::Atom, periodic_table::ElementType, EnergyOracle, Method, Molecule, OracleConfig,
    QuantumChemistryOracle,
};

fn hydrogen() -> Molecule {
    Molecule::neutral(vec![
        Atom::new(ElementType::H, Vector3::zeros()),
        Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 0.735)),
    ])
    .unwrap()
}

fn water() -> Molecule {
    Molecule::neutral(vec![
        Atom::new(ElementType::O, Vector3::zeros()),
        Atom::new(ElementType::H, Vector3::new(0.0, 0.757, 0.587)),
        Atom::new(ElementType::H, Vector3::new(0.0, -0.757, 0.587)),
    ])
    .unwrap()
}

fn lithium_hydride_cation() -> Molecule {
    Molecule::new(
        vec![
            Atom::new(ElementType::Li, Vector3::zeros()),
            Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.6)),
        ],
        1,
        NonZeroU32::new(2).unwrap(),
    )
    .unwrap()
}

fn bench_oracle(c: &mut Criterion) {
    let instances = [
        ("hydrogen", hydrogen()),
        ("water", water()),
        ("lithium hydride cation", lithium_hydride_cation()),
    ];

    for method in [Method::HartreeFock, Method::FullConfigurationInteraction] {
        for (name, molecule) in &instances {
            let mut oracle = QuantumChemistryOracle::new(OracleConfig {
                method,
                ..Default::default()
            });

            c.bench_function(&format!("{method:?} {name} STO-3G"), |b| {
                b.iter(|| oracle.evaluate(molecule).unwrap())
            });
        }
    }
}

criterion_group!(benches, bench_oracle);
criterion_main!(benches);
