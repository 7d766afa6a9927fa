//! 裁剪几何模块
//!
//! 负责“显示空间裁剪框 + 缩放比例 → 源图解码区域 + 目标像素尺寸”的换算。
//!
//! # 设计思路
//!
//! - 纯函数实现，输入矩形与比例，输出唯一结果，便于测试。
//! - 目标尺寸使用单精度除法后**截断**（不是四舍五入），与解码器约定一致。
//! - 截断得到 0 时原样交给解码器，由解码器判定为解码失败，这里不做兜底。
//! - RTL 布局只影响水平方向：按源图宽度做镜像。

/// 裁剪矩形（左上角 + 宽高）。
///
/// 坐标允许为负（交给边界收敛处理），宽高在合法请求中必须大于 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// 通过左、上、右、下四条边构造；右/下不大于左/上时返回 `None`。
    pub fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Option<Self> {
        let width = u32::try_from(i64::from(right) - i64::from(left)).ok()?;
        let height = u32::try_from(i64::from(bottom) - i64::from(top)).ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::new(left, top, width, height))
    }

    /// 右边界（不含）。
    pub fn right(&self) -> i64 {
        i64::from(self.left) + i64::from(self.width)
    }

    /// 下边界（不含）。
    pub fn bottom(&self) -> i64 {
        i64::from(self.top) + i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 以源图宽度为轴做水平镜像（RTL 布局使用）。
    ///
    /// `left' = source_width - right`，纵向与宽高保持不变。
    pub fn mirrored(&self, source_width: u32) -> Self {
        let left = i64::from(source_width) - self.right();
        Self {
            left: saturate_i32(left),
            ..*self
        }
    }

    /// 矩形是否完全位于 `width x height` 的图片内。
    pub fn contains_within(&self, width: u32, height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right() <= i64::from(width)
            && self.bottom() <= i64::from(height)
    }

    /// 与 `width x height` 的图片求交集；交集为空时返回 `None`。
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let left = i64::from(self.left).max(0);
        let top = i64::from(self.top).max(0);
        let right = self.right().min(i64::from(width));
        let bottom = self.bottom().min(i64::from(height));

        if right <= left || bottom <= top {
            return None;
        }

        Some(Self {
            left: saturate_i32(left),
            top: saturate_i32(top),
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// 计算解码目标尺寸：`trunc(width / scale)`、`trunc(height / scale)`。
///
/// 比例小于 1（视图缩小）时目标尺寸大于裁剪框，反之更小；
/// 解码器据此直接产出最终像素预算，而不是先全尺寸解码再缩放。
pub fn target_dimensions(crop_rect: &CropRect, scale: f32) -> (u32, u32) {
    let target_width = (crop_rect.width as f32 / scale) as u32;
    let target_height = (crop_rect.height as f32 / scale) as u32;
    (target_width, target_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn target_dimensions_truncate_instead_of_round() {
        let rect = CropRect::new(0, 0, 100, 50);
        assert_eq!(target_dimensions(&rect, 4.0), (25, 12));
    }

    #[test]
    fn target_dimensions_grow_when_zoomed_out() {
        let rect = CropRect::new(10, 10, 300, 200);
        assert_eq!(target_dimensions(&rect, 0.5), (600, 400));
    }

    #[test]
    fn target_dimensions_reach_zero_for_huge_scale() {
        let rect = CropRect::new(0, 0, 100, 50);
        assert_eq!(target_dimensions(&rect, 1_000.0), (0, 0));
        assert_eq!(target_dimensions(&rect, 80.0), (1, 0));
    }

    #[test]
    fn from_ltrb_rejects_empty_rect() {
        assert_eq!(CropRect::from_ltrb(5, 5, 5, 10), None);
        assert_eq!(CropRect::from_ltrb(5, 5, 4, 10), None);
        assert_eq!(
            CropRect::from_ltrb(-2, 3, 8, 7),
            Some(CropRect::new(-2, 3, 10, 4))
        );
    }

    #[test]
    fn mirrored_flips_horizontally_only() {
        let rect = CropRect::new(10, 20, 30, 40);
        let mirrored = rect.mirrored(100);

        assert_eq!(mirrored, CropRect::new(60, 20, 30, 40));
        assert_eq!(mirrored.mirrored(100), rect);
    }

    #[test]
    fn clamp_to_intersects_with_image() {
        let rect = CropRect::new(-10, 90, 50, 50);
        assert_eq!(rect.clamp_to(100, 100), Some(CropRect::new(0, 90, 40, 10)));
        assert!(!rect.contains_within(100, 100));
    }

    #[test]
    fn clamp_to_returns_none_when_disjoint() {
        let rect = CropRect::new(120, 0, 10, 10);
        assert_eq!(rect.clamp_to(100, 100), None);
    }

    proptest! {
        // 比例取 k/8，保证单精度除法与整数除法的截断结果一致。
        #[test]
        fn target_dimensions_match_integer_floor(
            width in 1u32..10_000,
            height in 1u32..10_000,
            eighths in 1u32..=64,
        ) {
            let scale = eighths as f32 / 8.0;
            let rect = CropRect::new(0, 0, width, height);

            let (tw, th) = target_dimensions(&rect, scale);

            prop_assert_eq!(tw, width * 8 / eighths);
            prop_assert_eq!(th, height * 8 / eighths);
        }

        #[test]
        fn clamp_result_always_fits(
            left in -500i32..500,
            top in -500i32..500,
            width in 1u32..600,
            height in 1u32..600,
        ) {
            let rect = CropRect::new(left, top, width, height);
            if let Some(clamped) = rect.clamp_to(256, 128) {
                prop_assert!(clamped.contains_within(256, 128));
                prop_assert!(!clamped.is_empty());
            }
        }
    }
}
