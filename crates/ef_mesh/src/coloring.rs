// crates/ef_mesh/src/coloring.rs

//! 边着色算法
//!
//! 把边分成若干颜色组，同一组内任意两条边不共享节点。
//! 同色边向节点散射时互不冲突，可以无锁并行。

use std::collections::HashSet;

use tracing::debug;

use crate::traits::GeometryProvider;

/// 着色结果
#[derive(Debug, Clone)]
pub struct ColoringResult {
    /// 每条边的颜色
    pub edge_colors: Vec<usize>,
    /// 颜色数量
    pub num_colors: usize,
    /// 每个颜色包含的边数
    pub color_sizes: Vec<usize>,
    /// 每个颜色的边索引
    pub color_edges: Vec<Vec<usize>>,
}

impl ColoringResult {
    /// 获取指定颜色的边
    pub fn edges_with_color(&self, color: usize) -> &[usize] {
        if color < self.color_edges.len() {
            &self.color_edges[color]
        } else {
            &[]
        }
    }

    /// 获取边的颜色
    pub fn color_of(&self, edge: usize) -> Option<usize> {
        self.edge_colors.get(edge).copied()
    }

    /// 检查是否为有效着色（同色边无公共节点，且覆盖全部边）
    pub fn is_valid<G: GeometryProvider + ?Sized>(&self, geometry: &G) -> bool {
        if self.edge_colors.len() != geometry.n_edges() {
            return false;
        }
        let mut seen = vec![usize::MAX; geometry.n_nodes()];
        for (color, edges) in self.color_edges.iter().enumerate() {
            for &e in edges {
                let (i, j) = geometry.edge_nodes(e);
                if seen[i] == color || seen[j] == color {
                    return false;
                }
                seen[i] = color;
                seen[j] = color;
            }
        }
        true
    }

    /// 计算负载均衡度 (1.0 = 完美均衡)
    pub fn balance_factor(&self) -> f64 {
        if self.color_sizes.is_empty() {
            return 1.0;
        }

        let min_size = *self.color_sizes.iter().min().unwrap_or(&0);
        let max_size = *self.color_sizes.iter().max().unwrap_or(&1);

        if max_size == 0 {
            1.0
        } else {
            min_size as f64 / max_size as f64
        }
    }
}

/// 贪心边着色器
pub struct EdgeColoring;

impl EdgeColoring {
    /// 对边进行着色
    ///
    /// 边按"冲突度"（两端节点度数之和）降序处理，每条边取两端节点
    /// 已用颜色之外的最小颜色。
    pub fn color<G: GeometryProvider + ?Sized>(geometry: &G) -> ColoringResult {
        let n_edges = geometry.n_edges();
        let n_nodes = geometry.n_nodes();
        if n_edges == 0 {
            return ColoringResult {
                edge_colors: Vec::new(),
                num_colors: 0,
                color_sizes: Vec::new(),
                color_edges: Vec::new(),
            };
        }

        // 节点到边的关联表
        let mut node_edges: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
        for e in 0..n_edges {
            let (i, j) = geometry.edge_nodes(e);
            node_edges[i].push(e);
            if j != i {
                node_edges[j].push(e);
            }
        }

        // 高冲突度优先
        let mut order: Vec<usize> = (0..n_edges).collect();
        order.sort_by_key(|&e| {
            let (i, j) = geometry.edge_nodes(e);
            std::cmp::Reverse(node_edges[i].len() + node_edges[j].len())
        });

        let mut colors = vec![usize::MAX; n_edges];
        let mut num_colors = 0;

        for edge in order {
            let (i, j) = geometry.edge_nodes(edge);
            let used_colors: HashSet<usize> = node_edges[i]
                .iter()
                .chain(node_edges[j].iter())
                .filter_map(|&n| {
                    if colors[n] != usize::MAX {
                        Some(colors[n])
                    } else {
                        None
                    }
                })
                .collect();

            let mut color = 0;
            while used_colors.contains(&color) {
                color += 1;
            }

            colors[edge] = color;
            num_colors = num_colors.max(color + 1);
        }

        let mut color_edges: Vec<Vec<usize>> = vec![Vec::new(); num_colors];
        for (edge, &color) in colors.iter().enumerate() {
            color_edges[color].push(edge);
        }

        let color_sizes: Vec<usize> = color_edges.iter().map(|c| c.len()).collect();

        let result = ColoringResult {
            edge_colors: colors,
            num_colors,
            color_sizes,
            color_edges,
        };

        debug!(
            edges = n_edges,
            colors = result.num_colors,
            balance = result.balance_factor(),
            "边着色完成"
        );

        result
    }
}
