// src/geometry.rs
//! Целочисленная геометрия карты мира 320×200

use serde::{Deserialize, Serialize};

/// Ширина карты мира в пикселях
pub const WORLD_WIDTH: i32 = 320;
/// Высота карты мира в пикселях
pub const WORLD_HEIGHT: i32 = 200;

/// Целочисленная точка (локальная в провинции или глобальная на карте мира)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Прямоугольник провинции на карте мира
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Принадлежность точки с учётом правой и нижней границ
    #[must_use]
    pub const fn contains_inclusive(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}

/// Растеризует отрезок целочисленным алгоритмом Брезенхэма, включая оба конца.
///
/// Порядок шагов фиксирован: ошибка инициализируется как
/// `(dx > dy ? dx : -dy) / 2`, и на одной итерации возможен шаг и по X, и по Y.
#[must_use]
pub fn bresenham_line(p1: Point, p2: Point) -> Vec<Point> {
    let dx = (p2.x - p1.x).abs();
    let dy = (p2.y - p1.y).abs();
    let dir_x = if p1.x < p2.x { 1 } else { -1 };
    let dir_y = if p1.y < p2.y { 1 } else { -1 };

    let mut point = p1;
    let mut error = (if dx > dy { dx } else { -dy }) / 2;
    let mut points = Vec::with_capacity((dx.max(dy) + 1) as usize);

    loop {
        points.push(point);

        if point == p2 {
            break;
        }

        let inner_error = error;

        if inner_error > -dx {
            error -= dy;
            point.x += dir_x;
        }

        if inner_error < dy {
            error += dx;
            point.y += dir_y;
        }
    }

    points
}
