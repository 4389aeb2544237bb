use crate::model::Candle;

/// 제한된 크기의 캔들 저장소
///
/// 지표 계산에 넘길 시계열을 준비하는 호출자 측 컨테이너입니다.
/// 데이터는 datetime 기준 오름차순으로 저장되며 (오래된 데이터가 먼저 옴),
/// 같은 시각의 캔들은 하나만 유지됩니다.
/// 최대 크기를 초과하면 가장 오래된 데이터가 제거됩니다.
#[derive(Debug, Clone)]
pub struct CandleStore<T: Candle> {
    items: Vec<T>,
    pub max_size: usize,
}

impl<T> CandleStore<T>
where
    T: Candle,
{
    /// 새로운 CandleStore 인스턴스를 생성합니다.
    ///
    /// # Arguments
    /// * `items` - 초기 아이템 목록 (정렬되지 않아도 됨)
    /// * `max_size` - 저장소의 최대 크기
    pub fn new(items: Vec<T>, max_size: usize) -> CandleStore<T> {
        let mut store = CandleStore {
            items: Vec::with_capacity(items.len().min(max_size)),
            max_size,
        };
        for item in items {
            store.add(item);
        }
        store
    }

    /// 데이터를 datetime 기준 오름차순 위치에 삽입합니다.
    ///
    /// 같은 시각의 캔들이 이미 있으면 새 캔들로 교체합니다.
    ///
    /// # Arguments
    /// * `data` - 삽입할 데이터
    pub fn add(&mut self, data: T) {
        match self
            .items
            .binary_search_by(|item| item.datetime().cmp(&data.datetime()))
        {
            Ok(idx) => {
                log::trace!("중복 캔들 교체: {}", data.datetime());
                self.items[idx] = data;
            }
            Err(idx) => self.items.insert(idx, data),
        }

        if self.items.len() > self.max_size {
            let excess = self.items.len() - self.max_size;
            self.items.drain(0..excess);
        }
    }

    /// 저장소에 있는 아이템 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 가장 오래된 아이템
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// 가장 최근 아이템
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// 시간 오름차순 아이템 슬라이스
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;
    use chrono::{DateTime, Utc};

    fn candle(ts: i64, close: f64) -> Ohlcv {
        let time = DateTime::<Utc>::from_timestamp(ts, 0).unwrap();
        Ohlcv::new(time, close, close, close, close, 1.0)
    }

    #[test]
    fn test_sorts_ascending() {
        let store = CandleStore::new(vec![candle(30, 3.0), candle(10, 1.0), candle(20, 2.0)], 10);
        let closes: Vec<f64> = store.items().iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_duplicate_time_replaced() {
        let mut store = CandleStore::new(vec![candle(10, 1.0)], 10);
        store.add(candle(10, 5.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.first().unwrap().close, 5.0);
    }

    #[test]
    fn test_max_size_drops_oldest() {
        let mut store = CandleStore::new(vec![], 2);
        store.add(candle(10, 1.0));
        store.add(candle(20, 2.0));
        store.add(candle(30, 3.0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.first().unwrap().close, 2.0);
        assert_eq!(store.last().unwrap().close, 3.0);
    }
}
