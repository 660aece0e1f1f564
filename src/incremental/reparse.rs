//! Re-parsing the damaged part of a module in place.
//!
//! A module's item list is repaired level by level. When exactly one item
//! strictly contains the damage, only that item is re-parsed: a definition
//! on its own, a group through its own item list. Otherwise the damaged
//! items, grown over neighbours the new text now extends, are re-parsed as
//! one region and spliced back. The region is then widened until the new
//! text lexes the same way at both of its seams, so that an edit opening or
//! closing a comment between items takes the items it swallows or releases
//! with it. Items after the region are shifted, their assignments and memos
//! stay as they are.
//!
//! A level that cannot repair the damage returns [`SyntaxDamage`]; its
//! `depth` counts how many levels up the repair has to restart. A depth
//! that reaches the module means the whole module is re-parsed.

use std::sync::Arc;

use text_size::TextRange;
use thiserror::Error;

use super::damage::{DamageRegion, Growth, classify_elements, grow};
use crate::base::{Shift, overlaps};
use crate::hir::{Item, Lowerer, ModuleData, ScopeId};
use crate::parser::{Lexer, first_token_from, last_token_in, parse_items, token_crosses};
use crate::syntax::{ItemSyntax, Visibility};

/// The edit could not be repaired at the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("syntax damage escalates {depth} level(s)")]
pub struct SyntaxDamage {
    pub depth: u32,
}

impl SyntaxDamage {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    /// The same damage as seen one level up.
    pub fn decremented(self) -> Self {
        Self {
            depth: self.depth.saturating_sub(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReparseOutcome {
    /// Only positions moved; no item was re-created.
    Shifted,
    /// `removed` items covering `region` (old coordinates) were replaced by
    /// `inserted` new ones.
    Reparsed {
        region: TextRange,
        removed: usize,
        inserted: usize,
    },
    /// The project re-parsed the module from scratch.
    Full,
}

/// The item list being repaired.
#[derive(Clone, Copy, Debug)]
struct ListTarget {
    scope: ScopeId,
    inherited: Option<Visibility>,
    /// Text between the container's braces, old coordinates.
    body: TextRange,
}

pub struct ReparseEngine<'a> {
    /// The edited text.
    text: &'a str,
    damage: DamageRegion,
}

impl<'a> ReparseEngine<'a> {
    pub fn new(text: &'a str, damage: DamageRegion) -> Self {
        Self { text, damage }
    }

    /// Repair `module` after the edit. On error the module is unchanged.
    pub fn reparse_module(&self, module: &mut ModuleData) -> Result<ReparseOutcome, SyntaxDamage> {
        let target = ListTarget {
            scope: module.root,
            inherited: None,
            body: module.body,
        };
        let mut items = std::mem::take(&mut module.items);
        let result = self.reparse_list(module, &mut items, target);
        module.items = items;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(damage) => {
                tracing::debug!("[REPARSE] module {} needs a full re-parse ({})", module.identifier, damage);
                return Err(damage.decremented());
            }
        };
        let delta = self.damage.delta;
        stretch(&mut module.location.range, delta);
        stretch(&mut module.body, delta);
        if let Some(root) = module.scopes.get_mut(module.root) {
            stretch(&mut root.location.range, delta);
        }
        if matches!(outcome, ReparseOutcome::Reparsed { .. }) {
            module.rebuild_declarations();
        }
        tracing::debug!("[REPARSE] module {}: {:?}", module.identifier, outcome);
        Ok(outcome)
    }

    fn reparse_list(
        &self,
        module: &mut ModuleData,
        items: &mut Arc<Vec<Item>>,
        target: ListTarget,
    ) -> Result<ReparseOutcome, SyntaxDamage> {
        let damage = self.damage.range;
        if damage.start() < target.body.start() || target.body.end() < damage.end() {
            tracing::trace!("[REPARSE] damage {:?} reaches the braces of {:?}", damage, target.body);
            return Err(SyntaxDamage::new(1));
        }

        let ranges: Vec<TextRange> = items.iter().map(|item| item.location().range).collect();
        let classification = classify_elements(ranges.iter().copied(), damage);
        let mut damaged = classification.damaged;

        if let [index] = classification.enveloped[..] {
            match self.reparse_enveloped(module, items, index, target) {
                Ok(outcome) => {
                    self.shift_tail(module, items, index + 1);
                    return Ok(outcome);
                }
                Err(escalated) if escalated.depth > 1 => return Err(escalated.decremented()),
                Err(_) => damaged.push(index),
            }
        }

        let growth = grow(
            &ranges,
            damage,
            &damaged,
            |before| {
                let boundary = items[before].boundary();
                first_token_from(self.text, ranges[before].end())
                    .is_some_and(|token| boundary.extension.contains(token))
            },
            |after, region| {
                let boundary = items[after].boundary();
                let start = self.damage.offset_to_new(ranges[after].start());
                let preceding = TextRange::new(region.start(), start);
                last_token_in(self.text, preceding).is_some_and(|token| boundary.prefixes.contains(token))
            },
        );
        let growth = self.align_seams(&ranges, target.body, growth)?;
        let region = self.damage.to_new(growth.range);
        let syntax = parse_items(module.file, self.text, region).map_err(|error| {
            tracing::debug!("[REPARSE] region {:?} does not parse: {}", region, error);
            SyntaxDamage::new(1)
        })?;

        if growth.elements.is_empty() && syntax.is_empty() {
            self.shift_tail(module, items, growth.elements.end);
            return Ok(ReparseOutcome::Shifted);
        }

        let list = Arc::make_mut(items);
        let removed: Vec<Item> = list.drain(growth.elements.clone()).collect();
        for item in &removed {
            module.free_item(item);
        }
        let lowered = Lowerer::new(&mut module.assignments, &mut module.scopes).lower_items(
            syntax,
            target.scope,
            target.inherited,
        );
        let inserted = lowered.len();
        let at = growth.elements.start;
        list.splice(at..at, lowered);
        self.shift_tail(module, items, at + inserted);

        Ok(ReparseOutcome::Reparsed {
            region: growth.range,
            removed: removed.len(),
            inserted,
        })
    }

    /// Repair the one item that strictly contains the damage.
    fn reparse_enveloped(
        &self,
        module: &mut ModuleData,
        items: &mut Arc<Vec<Item>>,
        index: usize,
        target: ListTarget,
    ) -> Result<ReparseOutcome, SyntaxDamage> {
        if let Item::Group(group) = &items[index] {
            let nested = ListTarget {
                scope: group.scope,
                inherited: group.visibility.or(target.inherited),
                body: group.body,
            };
            let scope = group.scope;
            let list = Arc::make_mut(items);
            let Item::Group(group) = &mut list[index] else {
                return Err(SyntaxDamage::new(1));
            };
            let outcome = self.reparse_list(module, &mut group.items, nested)?;
            let delta = self.damage.delta;
            stretch(&mut group.location.range, delta);
            stretch(&mut group.body, delta);
            if let Some(scope) = module.scopes.get_mut(scope) {
                stretch(&mut scope.location.range, delta);
            }
            return Ok(outcome);
        }

        if self.damage.delimiter_change {
            tracing::trace!("[REPARSE] delimiter balance changed inside {:?}", items[index].location());
            return Err(SyntaxDamage::new(2));
        }
        let old = items[index].location().range;
        let region = self.damage.to_new(old);
        let mut syntax = parse_items(module.file, self.text, region).map_err(|error| {
            tracing::trace!("[REPARSE] item {:?} does not parse alone: {}", old, error);
            SyntaxDamage::new(1)
        })?;
        let replacement = match syntax.pop() {
            Some(item) if syntax.is_empty() && same_variant(&items[index], &item) => item,
            _ => return Err(SyntaxDamage::new(1)),
        };
        if token_crosses(self.text, region.start(), region.end()) {
            tracing::trace!("[REPARSE] a token now runs past the end of {:?}", old);
            return Err(SyntaxDamage::new(1));
        }

        let list = Arc::make_mut(items);
        module.free_item(&list[index]);
        let mut lowered = Lowerer::new(&mut module.assignments, &mut module.scopes).lower_items(
            vec![replacement],
            target.scope,
            target.inherited,
        );
        if let Some(item) = lowered.pop() {
            list[index] = item;
        }
        tracing::trace!("[REPARSE] re-parsed item {:?} alone", old);
        Ok(ReparseOutcome::Reparsed {
            region: old,
            removed: 1,
            inserted: 1,
        })
    }

    /// Widen `growth` until the kept items on both sides lex as before.
    ///
    /// The kept item before the region must still end on a token boundary.
    /// Between its end and the shifted start of the kept item after the
    /// region, no token may run across that start, and every token outside
    /// the region must be trivia that does not straddle the region's edge.
    /// A token running into the next item pulls it in; anything else outside
    /// the region widens the region over the whole gap.
    fn align_seams(&self, ranges: &[TextRange], body: TextRange, mut growth: Growth) -> Result<Growth, SyntaxDamage> {
        loop {
            let (lo, hi) = (growth.elements.start, growth.elements.end);
            if lo > 0 && token_crosses(self.text, ranges[lo - 1].start(), ranges[lo - 1].end()) {
                tracing::trace!("[REPARSE] the new text runs into the end of {:?}", ranges[lo - 1]);
                growth.elements.start -= 1;
                growth.range = growth.range.cover(ranges[lo - 1]);
                continue;
            }

            let gap_start = if lo > 0 { ranges[lo - 1].end() } else { body.start() };
            let gap_end = ranges.get(hi).map_or(body.end(), |range| range.start());
            let seam = self.damage.offset_to_new(gap_end);
            let region = self.damage.to_new(growth.range);
            let slice = self.text.get(usize::from(gap_start)..).ok_or(SyntaxDamage::new(1))?;

            let mut widened = false;
            for token in Lexer::with_base(slice, gap_start) {
                let range = token.range();
                if range.start() >= seam {
                    break;
                }
                if range.end() > seam {
                    if hi == ranges.len() {
                        tracing::trace!("[REPARSE] a token now runs into the closing brace of {:?}", body);
                        return Err(SyntaxDamage::new(1));
                    }
                    tracing::trace!("[REPARSE] a token now runs into the start of {:?}", ranges[hi]);
                    growth.elements.end += 1;
                    growth.range = growth.range.cover(ranges[hi]);
                    widened = true;
                    break;
                }
                let outside = !region.contains_range(range);
                if outside && (!token.kind.is_trivia() || overlaps(range, region)) {
                    let covered = growth.range.cover(TextRange::new(gap_start, gap_end));
                    widened = covered != growth.range;
                    growth.range = covered;
                    break;
                }
            }
            if !widened {
                return Ok(growth);
            }
        }
    }

    fn shift_tail(&self, module: &mut ModuleData, items: &mut Arc<Vec<Item>>, from: usize) {
        if self.damage.delta == 0 || from >= items.len() {
            return;
        }
        let list = Arc::make_mut(items);
        for item in &mut list[from..] {
            module.shift_item(item, self.damage.delta);
        }
    }
}

fn same_variant(item: &Item, syntax: &ItemSyntax) -> bool {
    matches!(
        (item, syntax),
        (Item::Definition(_), ItemSyntax::Definition(_))
            | (Item::Import(_), ItemSyntax::Import(_))
            | (Item::Control(_), ItemSyntax::Control(_))
            | (Item::Attributes(_), ItemSyntax::Attributes(_))
    )
}

/// Move only the end of a container range that encloses the damage.
fn stretch(range: &mut TextRange, delta: i64) {
    let mut end = TextRange::empty(range.end());
    end.shift(delta);
    *range = TextRange::new(range.start(), end.end().max(range.start()));
}
