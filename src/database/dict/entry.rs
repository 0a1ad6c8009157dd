//! Vacant/occupied API словаря: один поиск — одна вставка или замена.

use std::{
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

use super::dict_base::{DictNode, Link, SeedHashBuilder};

pub enum Entry<'a, K, V, S = SeedHashBuilder> {
    Occupied(OccupiedEntry<'a, K, V>),
    Vacant(VacantEntry<'a, K, V, S>),
}

/// Запись найдена: `slot` — ссылка, указывающая на узел (бакет либо поле
/// `next` предшественника в цепочке).
pub struct OccupiedEntry<'a, K, V> {
    pub(crate) slot: &'a mut Link<K, V>,
    pub(crate) used: &'a mut usize,
}

/// Записи нет: `slot` — голова бакета целевой таблицы.
pub struct VacantEntry<'a, K, V, S = SeedHashBuilder> {
    pub(crate) key: K,
    pub(crate) slot: &'a mut Link<K, V>,
    pub(crate) used: &'a mut usize,
    pub(crate) _marker: PhantomData<S>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    #[inline]
    pub fn key(&self) -> &K {
        &self.slot.as_ref().unwrap().key
    }

    #[inline]
    pub fn get(&self) -> &V {
        &self.slot.as_ref().unwrap().val
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.slot.as_mut().unwrap().val
    }

    #[inline]
    pub fn into_mut(self) -> &'a mut V {
        &mut self.slot.as_mut().unwrap().val
    }

    /// Заменяет значение, возвращая старое.
    #[inline]
    pub fn insert(
        &mut self,
        val: V,
    ) -> V {
        std::mem::replace(&mut self.slot.as_mut().unwrap().val, val)
    }

    /// Изымает узел из цепочки и возвращает значение.
    #[inline]
    pub fn remove(self) -> V {
        let mut node = self.slot.take().unwrap();

        *self.slot = node.next.take();
        *self.used -= 1;
        node.val
    }
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Вставляет значение новым узлом в голову цепочки.
    pub fn insert(
        self,
        val: V,
    ) -> &'a mut V {
        let old_head = self.slot.take();

        *self.slot = Some(Box::new(DictNode {
            key: self.key,
            val,
            next: old_head,
        }));

        *self.used += 1;
        &mut self.slot.as_mut().unwrap().val
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn or_insert(
        self,
        default: V,
    ) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default),
        }
    }

    pub fn or_insert_with(
        self,
        f: impl FnOnce() -> V,
    ) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(f()),
        }
    }

    pub fn and_modify(
        self,
        f: impl FnOnce(&mut V),
    ) -> Self {
        match self {
            Entry::Occupied(mut e) => {
                f(e.get_mut());
                Entry::Occupied(e)
            }
            Entry::Vacant(e) => Entry::Vacant(e),
        }
    }

    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(e) => e.key(),
            Entry::Vacant(e) => e.key(),
        }
    }
}
