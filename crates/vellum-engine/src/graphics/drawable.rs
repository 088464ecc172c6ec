use crate::batch::SpriteBatch;
use crate::canvas::Canvas;
use crate::mesh::Mesh;
use crate::particles::ParticleSystem;

use super::{Image, Text};

/// Everything [`RenderContext::draw`](super::RenderContext::draw) accepts.
#[derive(Debug, Copy, Clone)]
pub enum Drawable<'a> {
    Image(&'a Image),
    Canvas(&'a Canvas),
    SpriteBatch(&'a SpriteBatch),
    Mesh(&'a Mesh),
    ParticleSystem(&'a ParticleSystem),
    Text(&'a Text),
}

impl Drawable<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Drawable::Image(_) => "image",
            Drawable::Canvas(_) => "canvas",
            Drawable::SpriteBatch(_) => "sprite batch",
            Drawable::Mesh(_) => "mesh",
            Drawable::ParticleSystem(_) => "particle system",
            Drawable::Text(_) => "text",
        }
    }
}

macro_rules! drawable_from {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Drawable<'a> {
                #[inline]
                fn from(d: &'a $ty) -> Self {
                    Drawable::$ty(d)
                }
            }
        )*
    };
}

drawable_from!(Image, Canvas, SpriteBatch, Mesh, ParticleSystem, Text);
