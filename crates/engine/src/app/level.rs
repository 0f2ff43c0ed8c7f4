use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::EngineError;

use super::pixel_grid::is_opaque;
use super::sprite::{BlockingMode, Sprite};

/// Owned collection of sprites plus static level metadata.
///
/// Insertion order is kept but carries no meaning for queries except as the
/// tie-breaker between sprites on the same layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    sprites: Vec<Sprite>,
    grid_size: Option<(u32, u32)>,
    name: Option<String>,
    data: BTreeMap<String, Value>,
}

impl Level {
    pub fn new(sprites: Vec<Sprite>) -> Self {
        Self {
            sprites,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_grid_size(mut self, width: u32, height: u32) -> Self {
        self.grid_size = Some((width, height));
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn grid_size(&self) -> Option<(u32, u32)> {
        self.grid_size
    }

    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut [Sprite] {
        &mut self.sprites
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn add_sprite(&mut self, sprite: Sprite) -> usize {
        self.sprites.push(sprite);
        self.sprites.len() - 1
    }

    pub fn remove_sprite(&mut self, index: usize) -> Result<Sprite, EngineError> {
        if index >= self.sprites.len() {
            return Err(EngineError::IndexOutOfRange {
                what: "sprite",
                index: index as i64,
                len: self.sprites.len(),
            });
        }
        Ok(self.sprites.remove(index))
    }

    /// Returns how many sprites were removed.
    pub fn remove_sprites_named(&mut self, name: &str) -> usize {
        let before = self.sprites.len();
        self.sprites.retain(|sprite| sprite.name() != name);
        before - self.sprites.len()
    }

    pub fn remove_all_sprites(&mut self) {
        self.sprites.clear();
    }

    pub fn sprite_by_name(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|sprite| sprite.name() == name)
    }

    pub fn sprite_by_name_mut(&mut self, name: &str) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|sprite| sprite.name() == name)
    }

    pub(crate) fn sprite_index_by_name(&self, name: &str) -> Option<usize> {
        self.sprites.iter().position(|sprite| sprite.name() == name)
    }

    pub fn sprites_by_name(&self, name: &str) -> Vec<&Sprite> {
        self.sprites
            .iter()
            .filter(|sprite| sprite.name() == name)
            .collect()
    }

    pub fn sprites_by_tag(&self, tag: &str) -> Vec<&Sprite> {
        self.sprites
            .iter()
            .filter(|sprite| sprite.has_tag(tag))
            .collect()
    }

    /// Sprites carrying every tag in `tags`; an empty list matches nothing.
    pub fn sprites_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&Sprite> {
        if tags.is_empty() {
            return Vec::new();
        }
        self.sprites
            .iter()
            .filter(|sprite| tags.iter().all(|tag| sprite.has_tag(tag.as_ref())))
            .collect()
    }

    /// Sprites carrying at least one tag in `tags`.
    pub fn sprites_by_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&Sprite> {
        self.sprites
            .iter()
            .filter(|sprite| tags.iter().any(|tag| sprite.has_tag(tag.as_ref())))
            .collect()
    }

    pub fn all_tags(&self) -> BTreeSet<&str> {
        self.sprites
            .iter()
            .flat_map(|sprite| sprite.tags().iter().map(String::as_str))
            .collect()
    }

    /// Topmost sprite covering world point `(x, y)`.
    ///
    /// Higher layers win; on equal layers the later-inserted sprite wins.
    /// Pixel-perfect sprites only match on an opaque pixel.
    pub fn sprite_index_at(
        &self,
        x: i32,
        y: i32,
        tag: Option<&str>,
        ignore_collidable: bool,
    ) -> Option<usize> {
        let mut best: Option<(i32, usize)> = None;
        for (index, sprite) in self.sprites.iter().enumerate() {
            if !ignore_collidable && !sprite.is_collidable() {
                continue;
            }
            if tag.is_some_and(|tag| !sprite.has_tag(tag)) {
                continue;
            }
            if !sprite.contains_point(x, y) {
                continue;
            }
            if best.is_some_and(|(layer, _)| layer > sprite.layer()) {
                continue;
            }
            if sprite.blocking() == BlockingMode::PixelPerfect {
                let local_x = (x - sprite.x()) as usize;
                let local_y = (y - sprite.y()) as usize;
                let hit = sprite
                    .render()
                    .get(local_x, local_y)
                    .is_some_and(is_opaque);
                if !hit {
                    continue;
                }
            }
            best = Some((sprite.layer(), index));
        }
        best.map(|(_, index)| index)
    }

    pub fn sprite_at(
        &self,
        x: i32,
        y: i32,
        tag: Option<&str>,
        ignore_collidable: bool,
    ) -> Option<&Sprite> {
        self.sprite_index_at(x, y, tag, ignore_collidable)
            .map(|index| &self.sprites[index])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::app::pixel_grid::PixelGrid;
    use crate::app::sprite::InteractionMode;

    fn dot(name: &str, value: i8) -> Sprite {
        Sprite::new(PixelGrid::filled(1, 1, value).expect("grid")).with_name(name)
    }

    fn tagged_level() -> Level {
        Level::new(vec![
            dot("a", 1).with_tag("red").with_tag("round"),
            dot("b", 2).with_tag("red"),
            dot("c", 3).with_tag("blue").with_tag("round"),
            dot("a", 4),
        ])
    }

    #[test]
    fn name_queries_return_all_matches_in_order() {
        let level = tagged_level();
        let named: Vec<i8> = level
            .sprites_by_name("a")
            .iter()
            .filter_map(|sprite| sprite.pixels().get(0, 0))
            .collect();
        assert_eq!(named, vec![1, 4]);
        assert!(level.sprites_by_name("missing").is_empty());
        assert_eq!(
            level.sprite_by_name("a").and_then(|s| s.pixels().get(0, 0)),
            Some(1)
        );
    }

    #[test]
    fn tag_queries_follow_and_or_semantics() {
        let level = tagged_level();
        assert_eq!(level.sprites_by_tag("red").len(), 2);
        assert_eq!(level.sprites_by_tags(&["red", "round"]).len(), 1);
        assert_eq!(level.sprites_by_any_tag(&["blue", "red"]).len(), 3);
        let none: [&str; 0] = [];
        assert!(level.sprites_by_tags(&none).is_empty());
        assert!(level.sprites_by_any_tag(&none).is_empty());
        assert_eq!(
            level.all_tags().into_iter().collect::<Vec<_>>(),
            vec!["blue", "red", "round"]
        );
    }

    #[test]
    fn removal_operations() {
        let mut level = tagged_level();
        assert_eq!(level.remove_sprites_named("a"), 2);
        let removed = level.remove_sprite(0).expect("index 0");
        assert_eq!(removed.name(), "b");
        assert!(matches!(
            level.remove_sprite(5),
            Err(EngineError::IndexOutOfRange { index: 5, len: 1, .. })
        ));
        level.remove_all_sprites();
        assert_eq!(level.sprite_count(), 0);
    }

    #[test]
    fn clone_is_independent() {
        let original = tagged_level().with_data("par", json!(12));
        let mut copy = original.clone();
        copy.sprite_by_name_mut("a")
            .expect("sprite a")
            .move_by(5, 5);
        copy.set_data("par", json!(3));
        copy.add_sprite(dot("d", 9));
        assert_eq!(
            original.sprite_by_name("a").map(Sprite::position),
            Some((0, 0))
        );
        assert_eq!(original.data("par"), Some(&json!(12)));
        assert_eq!(original.sprite_count(), 4);
    }

    #[test]
    fn metadata_builders() {
        let level = Level::default()
            .with_name("intro")
            .with_grid_size(8, 8)
            .with_data("hint", json!("go right"));
        assert_eq!(level.name(), Some("intro"));
        assert_eq!(level.grid_size(), Some((8, 8)));
        assert_eq!(level.data("hint"), Some(&json!("go right")));
        assert_eq!(level.data("missing"), None);
    }

    #[test]
    fn sprite_at_prefers_highest_layer_then_latest_insert() {
        let level = Level::new(vec![
            dot("floor", 1).with_layer(0),
            dot("top", 2).with_layer(3),
            dot("also_top", 3).with_layer(3),
            dot("under", 4).with_layer(1),
        ]);
        assert_eq!(level.sprite_at(0, 0, None, false).map(Sprite::name), Some("also_top"));
        assert_eq!(level.sprite_index_at(0, 0, None, false), Some(2));
        assert!(level.sprite_at(1, 0, None, false).is_none());
    }

    #[test]
    fn sprite_at_respects_tag_and_collidability() {
        let level = Level::new(vec![
            dot("wall", 1).with_tag("solid"),
            dot("ghost", 2)
                .with_layer(5)
                .with_interaction(InteractionMode::Intangible),
        ]);
        assert_eq!(level.sprite_at(0, 0, None, false).map(Sprite::name), Some("wall"));
        assert_eq!(level.sprite_at(0, 0, None, true).map(Sprite::name), Some("ghost"));
        assert_eq!(
            level.sprite_at(0, 0, Some("solid"), true).map(Sprite::name),
            Some("wall")
        );
        assert!(level.sprite_at(0, 0, Some("water"), true).is_none());
    }

    #[test]
    fn pixel_perfect_sprite_at_requires_opaque_pixel() {
        let ring = Sprite::from_rows(vec![vec![1, 1, 1], vec![1, -1, 1], vec![1, 1, 1]])
            .expect("ring")
            .with_name("ring")
            .with_layer(2)
            .with_blocking(BlockingMode::PixelPerfect);
        let floor = Sprite::new(PixelGrid::filled(3, 3, 0).expect("grid")).with_name("floor");
        let level = Level::new(vec![floor, ring]);
        assert_eq!(level.sprite_at(1, 1, None, false).map(Sprite::name), Some("floor"));
        assert_eq!(level.sprite_at(0, 1, None, false).map(Sprite::name), Some("ring"));
    }

    #[test]
    fn sprite_at_uses_rendered_bounds() {
        let wide = Sprite::new(PixelGrid::filled(2, 1, 1).expect("grid"))
            .with_name("wide")
            .with_position(4, 4)
            .with_scale(2)
            .expect("scale");
        let level = Level::new(vec![wide]);
        assert!(level.sprite_at(7, 5, None, false).is_some());
        assert!(level.sprite_at(8, 5, None, false).is_none());
        assert!(level.sprite_at(3, 4, None, false).is_none());
    }
}
