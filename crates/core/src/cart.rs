//! Cart line items and the rules that keep a cart well-formed.
//!
//! A [`Cart`] is the single data structure shared by the local storage tier,
//! the remote account API and every front end. It guarantees:
//!
//! - at most one line per product ID, in insertion order;
//! - every line has a quantity of at least one;
//! - the total item count is derived from the lines, never stored.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};
use crate::validation::ValidationError;

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            quantity,
            image: None,
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has the requested quantity.
    Updated,
    /// The requested quantity was zero or less, so the line was dropped.
    Removed,
    /// No line exists for that product; nothing changed.
    Missing,
}

impl QuantityChange {
    /// Whether the cart contents changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::Missing)
    }
}

/// An ordered, duplicate-free collection of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from untrusted lines (storage, remote API).
    ///
    /// Lines with a zero quantity are dropped and repeated product IDs are
    /// folded into the first occurrence, so the result always satisfies the
    /// cart invariants.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            cart.merge_line(line);
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<LineItem> {
        self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Add an item, merging with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuantityOutOfRange`] for a zero quantity.
    pub fn add(&mut self, item: LineItem) -> Result<(), ValidationError> {
        if item.quantity == 0 {
            return Err(ValidationError::QuantityOutOfRange {
                min: 1,
                max: u32::MAX,
            });
        }
        self.merge_line(item);
        Ok(())
    }

    /// Set a line's quantity exactly.
    ///
    /// A quantity of zero or less removes the line. Unknown products are
    /// left alone and reported as [`QuantityChange::Missing`].
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> QuantityChange {
        let Some(index) = self.position(product_id) else {
            return QuantityChange::Missing;
        };

        if quantity <= 0 {
            self.lines.remove(index);
            return QuantityChange::Removed;
        }

        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        QuantityChange::Updated
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| &line.product_id == product_id)
    }

    fn merge_line(&mut self, item: LineItem) {
        match self.position(&item.product_id) {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = line.quantity.saturating_add(item.quantity);
                }
            }
            None => self.lines.push(item),
        }
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(lines: Vec<LineItem>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
