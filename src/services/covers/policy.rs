// 缩放规格表 - 封面类别到目标高度的映射
//
// 启动时构建一次的静态查找表；不在表中的类别没有缩放变体，
// 只缓存原图。

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::models::CoverKind;

lazy_static! {
    /// 类别 → 有序目标高度列表
    ///
    /// 高度按从大到小排列；生成顺序与列表顺序一致。
    static ref RESIZE_TARGETS: HashMap<CoverKind, Vec<u32>> = {
        let mut m = HashMap::new();
        m.insert(CoverKind::Poster, vec![500, 250]);
        m.insert(CoverKind::Headshot, vec![500, 250]);
        m.insert(CoverKind::Banner, vec![70, 35]);
        m.insert(CoverKind::Fanart, vec![360, 180]);
        m.insert(CoverKind::Screenshot, vec![360, 180]);
        m
    };
}

/// 查询封面类别的缩放目标高度
///
/// 不在表中的类别返回空切片，调用方据此跳过缩放。
pub fn resize_targets(kind: CoverKind) -> &'static [u32] {
    RESIZE_TARGETS
        .get(&kind)
        .map(|heights| heights.as_slice())
        .unwrap_or(&[])
}
