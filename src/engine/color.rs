// ==========================================
// avisos 看板 - 危急度配色
// ==========================================
// 职责: 危急度分值 → 绿→黄→红 渐变色
// 红线: 纯函数，同输入同输出
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 缺失值的中性色
pub const NEUTRAL_HEX: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb::new(46, 204, 113);
    pub const YELLOW: Rgb = Rgb::new(241, 196, 15);
    pub const RED: Rgb = Rgb::new(231, 76, 60);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// 0xRRGGBB（供 Excel 单元格底色使用）
    pub fn to_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// a → b 线性插值，u ∈ [0, 1]，通道四舍五入
    fn lerp(a: Rgb, b: Rgb, u: f64) -> Rgb {
        let channel = |x: u8, y: u8| -> u8 {
            let v = x as f64 + (y as f64 - x as f64) * u;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ==========================================
// CriticalityColorMapper
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalityColorMapper {
    vmin: f64,
    vmax: f64,
}

impl Default for CriticalityColorMapper {
    fn default() -> Self {
        Self::new(1.0, 100.0)
    }
}

impl CriticalityColorMapper {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.vmin, self.vmax)
    }

    /// 归一化到 [0, 1]；vmin == vmax 时取 0
    fn normalize(&self, v: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        ((v - self.vmin) / span).clamp(0.0, 1.0)
    }

    /// 分值 → 颜色；缺失或 NaN 返回 None
    pub fn rgb(&self, value: Option<f64>) -> Option<Rgb> {
        let v = value.filter(|v| !v.is_nan())?;
        let t = self.normalize(v);
        let rgb = if t <= 0.5 {
            Rgb::lerp(Rgb::GREEN, Rgb::YELLOW, t / 0.5)
        } else {
            Rgb::lerp(Rgb::YELLOW, Rgb::RED, (t - 0.5) / 0.5)
        };
        Some(rgb)
    }

    /// 分值 → `#rrggbb`；缺失为白色
    pub fn color_hex(&self, value: Option<f64>) -> String {
        self.rgb(value)
            .map(|c| c.to_hex())
            .unwrap_or_else(|| NEUTRAL_HEX.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex_color(s: &str) -> bool {
        s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn test_anchor_colors() {
        let mapper = CriticalityColorMapper::default();
        assert_eq!(mapper.color_hex(Some(1.0)), "#2ecc71");
        assert_eq!(mapper.color_hex(Some(50.5)), "#f1c40f");
        assert_eq!(mapper.color_hex(Some(100.0)), "#e74c3c");
    }

    #[test]
    fn test_missing_is_white() {
        let mapper = CriticalityColorMapper::default();
        assert_eq!(mapper.color_hex(None), "#ffffff");
        assert_eq!(mapper.color_hex(Some(f64::NAN)), "#ffffff");
    }

    #[test]
    fn test_out_of_range_clamped() {
        let mapper = CriticalityColorMapper::default();
        assert_eq!(mapper.color_hex(Some(-20.0)), "#2ecc71");
        assert_eq!(mapper.color_hex(Some(500.0)), "#e74c3c");
    }

    #[test]
    fn test_degenerate_bounds_use_green() {
        let mapper = CriticalityColorMapper::new(10.0, 10.0);
        assert_eq!(mapper.color_hex(Some(10.0)), "#2ecc71");
        assert_eq!(mapper.color_hex(Some(99.0)), "#2ecc71");
    }

    #[test]
    fn test_well_formed_and_deterministic_over_domain() {
        let mapper = CriticalityColorMapper::default();
        for i in 0..=990 {
            let v = 1.0 + i as f64 * 0.1;
            let hex = mapper.color_hex(Some(v));
            assert!(is_hex_color(&hex), "invalid color {} for {}", hex, v);
            assert_eq!(hex, mapper.color_hex(Some(v)));
        }
    }

    #[test]
    fn test_channel_monotonic_within_segments() {
        let mapper = CriticalityColorMapper::default();
        let samples: Vec<(f64, Rgb)> = (0..=990)
            .map(|i| 1.0 + i as f64 * 0.1)
            .map(|v| (v, mapper.rgb(Some(v)).unwrap()))
            .collect();

        for pair in samples.windows(2) {
            let (v1, c1) = pair[0];
            let (v2, c2) = pair[1];
            assert!(c2.g <= c1.g, "green must not increase ({} -> {})", v1, v2);
            // 绿→黄 段: 红色通道不减
            if v2 <= 50.5 {
                assert!(c2.r >= c1.r, "red must not decrease ({} -> {})", v1, v2);
            }
        }
    }

    #[test]
    fn test_rgb_to_u32() {
        assert_eq!(Rgb::GREEN.to_u32(), 0x2ecc71);
        assert_eq!(Rgb::RED.to_string(), "#e74c3c");
    }
}
