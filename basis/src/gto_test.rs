#[cfg(test)]
mod tests {
    use crate::basis::Basis;
    use crate::gto::{GTO1d, GTO};
    use crate::helper::*;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    #[test]
    fn test_gto1d_normalization() {
        for l in 0..4 {
            let gto = GTO1d::new(1.3, l, 0.7);
            let integral = simpson_integration(|x| gto.evaluate(x).powi(2), -10.0, 10.0, 10_000);
            assert!(
                (integral - 1.0).abs() < 1e-6,
                "l = {}: integral is not close to 1: got {}",
                l,
                integral
            );
        }
    }

    #[test]
    fn test_gto1d_overlap() {
        let gto1 = GTO1d::new(1.2, 1, 1.0);
        let gto2 = GTO1d::new(0.8, 2, 2.5);
        let integrand = |x: f64| gto1.evaluate(x) * gto2.evaluate(x);

        let integral = simpson_integration(integrand, -10.0, 12.0, 20_000);
        let overlap = GTO1d::Sab(&gto1, &gto2);
        assert!(
            (integral - overlap).abs() < 1e-6,
            "overlap {} vs quadrature {}",
            overlap,
            integral
        );
    }

    #[test]
    fn test_gto1d_kinetic() {
        let gto1 = GTO1d::new(0.9, 1, 0.0);
        let gto2 = GTO1d::new(0.6, 2, 0.8);
        let h = 1e-3;
        let second_derivative =
            |x: f64| (gto2.evaluate(x + h) - 2.0 * gto2.evaluate(x) + gto2.evaluate(x - h)) / (h * h);
        let integral =
            -0.5 * simpson_integration(|x| gto1.evaluate(x) * second_derivative(x), -12.0, 12.0, 20_000);
        let kinetic = GTO1d::Tab(&gto1, &gto2);
        assert!(
            (integral - kinetic).abs() < 1e-5,
            "kinetic {} vs finite difference {}",
            kinetic,
            integral
        );
    }

    #[test]
    fn test_gto_overlap_factorizes() {
        let gto1 = GTO::new(1.2, Vector3::new(1, 0, 1), Vector3::new(0.0, 0.1, 0.0));
        let gto2 = GTO::new(0.8, Vector3::new(1, 1, 0), Vector3::new(0.5, 0.0, -0.4));
        let expected = (0..3)
            .map(|k| GTO1d::Sab(&gto1.gto1d[k], &gto2.gto1d[k]))
            .product::<f64>();
        assert!((GTO::Sab(&gto1, &gto2) - expected).abs() < 1e-14);
        assert!((GTO::Sab(&gto1, &gto2) - GTO::Sab(&gto2, &gto1)).abs() < 1e-14);
    }

    #[test]
    fn test_nuclear_attraction_same_center() {
        let alpha = 0.75;
        let center = Vector3::new(0.2, -0.3, 1.0);
        let s = GTO::new(alpha, Vector3::new(0, 0, 0), center);
        let v = GTO::Vab(&s, &s, center, 1);
        let expected = -2.0 * (2.0 * alpha / PI).sqrt();
        assert!((v - expected).abs() < 1e-12, "V = {}, expected {}", v, expected);

        // scales linearly with the nuclear charge
        let v8 = GTO::Vab(&s, &s, center, 8);
        assert!((v8 - 8.0 * expected).abs() < 1e-11);
    }

    #[test]
    fn test_nuclear_attraction_symmetry() {
        let a = GTO::new(1.1, Vector3::new(1, 0, 0), Vector3::new(0.0, 0.0, 0.0));
        let b = GTO::new(0.4, Vector3::new(0, 1, 1), Vector3::new(0.3, 0.9, -0.2));
        let r = Vector3::new(-0.5, 0.4, 0.7);
        assert!((GTO::Vab(&a, &b, r, 3) - GTO::Vab(&b, &a, r, 3)).abs() < 1e-12);
    }

    #[test]
    fn test_two_electron_same_center_s() {
        let alpha = 1.6;
        let s = GTO::new(alpha, Vector3::new(0, 0, 0), Vector3::zeros());
        let eri = GTO::JKabcd(&s, &s, &s, &s);
        let expected = 2.0 * (alpha / PI).sqrt();
        assert!((eri - expected).abs() < 1e-12, "(ss|ss) = {}, expected {}", eri, expected);
    }

    #[test]
    fn test_two_electron_permutational_symmetry() {
        let a = GTO::new(1.0, Vector3::new(1, 0, 0), Vector3::new(0.0, 0.0, 0.0));
        let b = GTO::new(0.5, Vector3::new(0, 0, 0), Vector3::new(0.0, 0.5, 0.3));
        let c = GTO::new(0.8, Vector3::new(0, 1, 0), Vector3::new(-0.4, 0.2, 0.0));
        let d = GTO::new(1.3, Vector3::new(0, 0, 1), Vector3::new(0.1, -0.6, 0.5));

        let reference = GTO::JKabcd(&a, &b, &c, &d);
        let permutations = [
            GTO::JKabcd(&b, &a, &c, &d),
            GTO::JKabcd(&a, &b, &d, &c),
            GTO::JKabcd(&b, &a, &d, &c),
            GTO::JKabcd(&c, &d, &a, &b),
            GTO::JKabcd(&d, &c, &b, &a),
        ];
        for val in permutations {
            assert!(
                (val - reference).abs() < 1e-12,
                "{} differs from {}",
                val,
                reference
            );
        }
    }

    #[test]
    fn test_eab_base_case() {
        let (a, b, qx) = (0.7, 1.9, 0.45);
        let q = a * b / (a + b);
        let e000 = GTO1d::Eab(0, 0, 0, qx, a, b);
        assert!((e000 - (-q * qx * qx).exp()).abs() < 1e-15);
        assert_eq!(GTO1d::Eab(1, 1, 3, qx, a, b), 0.0);
        assert_eq!(GTO1d::Eab(1, 0, -1, qx, a, b), 0.0);
    }
}
