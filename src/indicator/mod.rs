// 차트 오버레이용 기술적 지표 모듈
// 모든 지표는 정렬된 캔들 시계열을 받아 같은 길이의 출력 시계열을 만듭니다.

pub mod bucket;
pub mod ma;
pub mod pivot;
pub mod rsi;
pub mod vwap;

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::candle_store::CandleStore;
use crate::model::Candle;

/// 기술적 지표(TA)의 컬렉션을 관리하는 구조체
///
/// 여러 기술적 지표를 키-값 쌍으로 저장하고, 키의 삽입 순서를 유지합니다.
#[derive(Debug, Clone)]
pub struct TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    /// 이 컬렉션의 이름
    name: String,
    /// 순서가 유지되는 키 목록
    keys: Vec<K>,
    /// 키-값 쌍으로 저장된 기술적 지표
    data: HashMap<K, T>,
}

impl<K, T> Display for TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TAs({})", self.name)
    }
}

impl<K, T> TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    /// 새로운 TAs 인스턴스 생성
    ///
    /// # Arguments
    /// * `name` - 컬렉션 이름
    /// * `keys` - 키 목록
    /// * `data` - 키-값 데이터
    pub fn new(name: String, keys: Vec<K>, data: HashMap<K, T>) -> TAs<K, T> {
        TAs { name, keys, data }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 키 목록 참조 반환
    pub fn get_keys(&self) -> &[K] {
        &self.keys
    }

    /// 지정된 키에 해당하는 값 참조 반환
    pub fn get(&self, key: &K) -> Option<&T> {
        self.data.get(key)
    }

    /// 키 순서대로 (키, 값) 쌍 반환
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.keys
            .iter()
            .filter_map(|key| self.data.get(key).map(|value| (key, value)))
    }

    /// 키 순서대로 모든 값의 참조 반환
    pub fn get_all(&self) -> Vec<&T> {
        self.iter().map(|(_, value)| value).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// 기술적 지표 계산 인터페이스
///
/// 구현체는 상태를 갖지 않으며, 같은 입력에 대해 항상 같은 결과를 돌려줍니다.
pub trait TABuilder<T, C: Candle>: Send + Sync + Debug {
    /// 저장소에서 기술적 지표 생성
    fn from_storage(&self, storage: &CandleStore<C>) -> T {
        self.build(storage.items())
    }

    /// 시간 오름차순 캔들 데이터에서 기술적 지표 생성
    fn build(&self, data: &[C]) -> T;
}

/// 여러 기술적 지표 빌더를 관리하는 구조체
///
/// 같은 지표를 여러 매개변수(기간, 집계 단위 등)로 한 번에 계산할 때 사용합니다.
pub struct TAsBuilder<K, T, C: Candle> {
    /// 이 빌더 컬렉션의 이름
    name: String,
    /// 순서가 유지되는 키 목록
    keys: Vec<K>,
    /// 각 키에 대응하는 개별 빌더
    builders: HashMap<K, Box<dyn TABuilder<T, C>>>,
}

impl<K, T, C> TAsBuilder<K, T, C>
where
    K: PartialEq + Eq + Hash + Clone + Debug,
    C: Candle,
{
    /// 새 TAsBuilder 인스턴스 생성
    ///
    /// # Arguments
    /// * `name` - 빌더 이름
    /// * `keys` - 키 목록 (중복 키는 한 번만 유지)
    /// * `gen_builder` - 각 키에 대한 빌더 생성 함수
    pub fn new(
        name: String,
        keys: &[K],
        gen_builder: impl Fn(&K) -> Box<dyn TABuilder<T, C>>,
    ) -> TAsBuilder<K, T, C> {
        let mut ordered = Vec::with_capacity(keys.len());
        let mut builders: HashMap<K, Box<dyn TABuilder<T, C>>> = HashMap::new();
        for key in keys {
            if builders.contains_key(key) {
                continue;
            }
            builders.insert(key.clone(), gen_builder(key));
            ordered.push(key.clone());
        }

        TAsBuilder {
            name,
            keys: ordered,
            builders,
        }
    }

    /// 저장소에서 기술적 지표 컬렉션 생성
    pub fn from_storage(&self, storage: &CandleStore<C>) -> TAs<K, T> {
        self.build(storage.items())
    }

    /// 데이터에서 기술적 지표 컬렉션 생성
    pub fn build(&self, data: &[C]) -> TAs<K, T> {
        let tas = self
            .builders
            .iter()
            .map(|(key, builder)| (key.clone(), builder.build(data)))
            .collect::<HashMap<_, _>>();

        TAs::new(self.name.to_owned(), self.keys.clone(), tas)
    }
}

impl<K: Debug, T, C> Debug for TAsBuilder<K, T, C>
where
    C: Candle,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TAsBuilder")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .field("builders", &format!("<{} builders>", self.builders.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tas_keeps_key_order() {
        let tas = TAs::new(
            "test".to_owned(),
            vec![3, 1, 2],
            HashMap::from([(1, "a"), (2, "b"), (3, "c")]),
        );
        assert_eq!(tas.get_all(), vec![&"c", &"a", &"b"]);
        assert_eq!(tas.get(&2), Some(&"b"));
        assert_eq!(tas.get(&9), None);
        assert_eq!(tas.len(), 3);
        assert_eq!(tas.to_string(), "TAs(test)");
    }
}
