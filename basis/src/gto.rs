#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::basis::Basis;
use crate::helper::boys_table;
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        let norm = GTO1d::compute_norm(alpha, l);
        Self {
            alpha,
            l,
            center,
            norm,
        }
    }

    // N^2 = 2^(3l) l! alpha^l sqrt(2 alpha / pi) / (2l)!
    fn compute_norm(alpha: f64, l: i32) -> f64 {
        let numerator = 2.0_f64.powi(3 * l) * factorial(l) * alpha.powi(l);
        let factor = (2.0 * alpha / PI).sqrt();
        (numerator * factor / factorial(2 * l)).sqrt()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.center;
        self.norm * x.powi(self.l) * (-self.alpha * x.powi(2)).exp()
    }

    /// McMurchie-Davidson Hermite expansion coefficient E^{ij}_t.
    ///
    /// `Qx` is the separation `A - B` of the two centres.
    pub fn Eab(i: i32, j: i32, t: i32, Qx: f64, a: f64, b: f64) -> f64 {
        let p = a + b;
        let q = a * b / p;

        if t < 0 || t > i + j || i < 0 || j < 0 {
            0.0
        } else if i == 0 && j == 0 && t == 0 {
            (-q * Qx.powi(2)).exp()
        } else if j == 0 {
            GTO1d::Eab(i - 1, j, t - 1, Qx, a, b) / (2.0 * p)
                - GTO1d::Eab(i - 1, j, t, Qx, a, b) * q * Qx / a
                + GTO1d::Eab(i - 1, j, t + 1, Qx, a, b) * ((t + 1) as f64)
        } else {
            GTO1d::Eab(i, j - 1, t - 1, Qx, a, b) / (2.0 * p)
                + GTO1d::Eab(i, j - 1, t, Qx, a, b) * q * Qx / b
                + GTO1d::Eab(i, j - 1, t + 1, Qx, a, b) * ((t + 1) as f64)
        }
    }

    // overlap integral
    pub(crate) fn Sab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha) * (PI / p).sqrt() * a.norm * b.norm
    }

    // kinetic integral, -1/2 <a| d^2/dx^2 |b>
    pub(crate) fn Tab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        let norm = a.norm * b.norm * (PI / p).sqrt();

        let term1 =
            b.l as f64 * (b.l as f64 - 1.0) * GTO1d::Eab(a.l, b.l - 2, 0, Qx, a.alpha, b.alpha);
        let term2 = -2.0
            * b.alpha
            * (2.0 * b.l as f64 + 1.0)
            * GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha);
        let term3 = 4.0 * b.alpha.powi(2) * GTO1d::Eab(a.l, b.l + 2, 0, Qx, a.alpha, b.alpha);

        -0.5 * norm * (term1 + term2 + term3)
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [
            GTO1d::new(alpha, l_xyz.x, center.x),
            GTO1d::new(alpha, l_xyz.y, center.y),
            GTO1d::new(alpha, l_xyz.z, center.z),
        ];
        let norm = gto1d[0].norm * gto1d[1].norm * gto1d[2].norm;
        Self {
            alpha,
            l_xyz,
            center,
            norm,
            gto1d,
        }
    }

    /// Same primitive moved to another centre.
    pub fn recentered(&self, center: Vector3<f64>) -> Self {
        GTO::new(self.alpha, self.l_xyz, center)
    }

    pub fn angular_momentum(&self) -> i32 {
        self.l_xyz.x + self.l_xyz.y + self.l_xyz.z
    }

    // Gaussian product centre and exponent
    fn product_center(a: &GTO, b: &GTO) -> (Vector3<f64>, f64) {
        let p = a.alpha + b.alpha;
        ((a.center * a.alpha + b.center * b.alpha) / p, p)
    }

    /// Coulomb auxiliary Hermite integral R^n_{tuv}.
    ///
    /// `boys` holds F_m(p |PC|^2) for m = 0..=t+u+v+n, the recursion of
    /// Helgaker, Jørgensen and Olsen is evaluated on top of it.
    pub fn hermite_coulomb(
        t: i32,
        u: i32,
        v: i32,
        n: i32,
        p: f64,
        PC: &Vector3<f64>,
        boys: &[f64],
    ) -> f64 {
        if t < 0 || u < 0 || v < 0 {
            return 0.0;
        }

        let mut val = 0.0;
        if t == 0 && u == 0 && v == 0 {
            val += (-2.0 * p).powi(n) * boys[n as usize];
        } else if t == 0 && u == 0 {
            if v > 1 {
                val += (v as f64 - 1.0) * GTO::hermite_coulomb(t, u, v - 2, n + 1, p, PC, boys);
            }
            val += PC.z * GTO::hermite_coulomb(t, u, v - 1, n + 1, p, PC, boys);
        } else if t == 0 {
            if u > 1 {
                val += (u as f64 - 1.0) * GTO::hermite_coulomb(t, u - 2, v, n + 1, p, PC, boys);
            }
            val += PC.y * GTO::hermite_coulomb(t, u - 1, v, n + 1, p, PC, boys);
        } else {
            if t > 1 {
                val += (t as f64 - 1.0) * GTO::hermite_coulomb(t - 2, u, v, n + 1, p, PC, boys);
            }
            val += PC.x * GTO::hermite_coulomb(t - 1, u, v, n + 1, p, PC, boys);
        }

        val
    }

    fn hermite_expansion(a: &GTO, b: &GTO) -> [Vec<f64>; 3] {
        let dab = a.center - b.center;
        let coeffs = |dim: usize| -> Vec<f64> {
            (0..=a.l_xyz[dim] + b.l_xyz[dim])
                .map(|t| GTO1d::Eab(a.l_xyz[dim], b.l_xyz[dim], t, dab[dim], a.alpha, b.alpha))
                .collect()
        };
        [coeffs(0), coeffs(1), coeffs(2)]
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
            * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
            * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
    }

    fn Tab(a: &GTO, b: &GTO) -> f64 {
        let s = [
            GTO1d::Sab(&a.gto1d[0], &b.gto1d[0]),
            GTO1d::Sab(&a.gto1d[1], &b.gto1d[1]),
            GTO1d::Sab(&a.gto1d[2], &b.gto1d[2]),
        ];
        GTO1d::Tab(&a.gto1d[0], &b.gto1d[0]) * s[1] * s[2]
            + GTO1d::Tab(&a.gto1d[1], &b.gto1d[1]) * s[0] * s[2]
            + GTO1d::Tab(&a.gto1d[2], &b.gto1d[2]) * s[0] * s[1]
    }

    fn Vab(a: &GTO, b: &GTO, R: Vector3<f64>, Z: u32) -> f64 {
        let (P, p) = GTO::product_center(a, b);
        let PC = P - R;
        let [ex, ey, ez] = GTO::hermite_expansion(a, b);

        let lmax = (ex.len() + ey.len() + ez.len() - 3) as i32;
        let boys = boys_table(lmax as usize, p * PC.norm_squared());

        let val: f64 = iproduct!(0..ex.len(), 0..ey.len(), 0..ez.len())
            .map(|(i, j, k)| {
                ex[i]
                    * ey[j]
                    * ez[k]
                    * GTO::hermite_coulomb(i as i32, j as i32, k as i32, 0, p, &PC, &boys)
            })
            .sum();

        // nuclear attraction is negative
        -a.norm * b.norm * val * 2.0 * PI * (Z as f64) / p
    }

    fn JKabcd(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let (P, p) = GTO::product_center(a, b);
        let (Q, q) = GTO::product_center(c, d);
        let PQ = P - Q;
        let alpha = p * q / (p + q);

        let [eab_x, eab_y, eab_z] = GTO::hermite_expansion(a, b);
        let [ecd_x, ecd_y, ecd_z] = GTO::hermite_expansion(c, d);

        let lmax = eab_x.len() + eab_y.len() + eab_z.len() + ecd_x.len() + ecd_y.len()
            + ecd_z.len()
            - 6;
        let boys = boys_table(lmax, alpha * PQ.norm_squared());

        let val: f64 = iproduct!(
            0..eab_x.len(),
            0..eab_y.len(),
            0..eab_z.len(),
            0..ecd_x.len(),
            0..ecd_y.len(),
            0..ecd_z.len()
        )
        .map(|(i, j, k, l, m, n)| {
            let hermite_val = GTO::hermite_coulomb(
                (i + l) as i32,
                (j + m) as i32,
                (k + n) as i32,
                0,
                alpha,
                &PQ,
                &boys,
            );
            let sgn = if (l + m + n) % 2 == 0 { 1.0 } else { -1.0 };
            eab_x[i] * eab_y[j] * eab_z[k] * ecd_x[l] * ecd_y[m] * ecd_z[n] * sgn * hermite_val
        })
        .sum();

        a.norm * b.norm * c.norm * d.norm * val * 2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt())
    }
}
