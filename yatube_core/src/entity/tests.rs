#[cfg(test)]
mod entity_tests {
    use chrono::Utc;

    use crate::entity::prelude::*;
    use crate::ids::*;
    use crate::test_utils::{create_test_group, create_test_post, create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = setup_test_db().await;

        let user_id = UserId::new();
        let user = UserActiveModel {
            id: Set(user_id),
            username: Set("sarah".to_string()),
            date_joined: Set(Utc::now()),
        };
        User::insert(user).exec(&db).await.expect("Failed to insert user");

        let found = User::find()
            .filter(UserColumn::Username.eq("sarah"))
            .one(&db)
            .await
            .expect("Failed to query user");

        assert!(found.is_some());
        assert_eq!(found.unwrap().id, user_id);
    }

    #[tokio::test]
    async fn test_username_unique_constraint() {
        let db = setup_test_db().await;
        create_test_user(&db, "sarah").await;

        let duplicate = UserActiveModel {
            id: Set(UserId::new()),
            username: Set("sarah".to_string()),
            date_joined: Set(Utc::now()),
        };

        let result = User::insert(duplicate).exec(&db).await;
        assert!(result.is_err(), "Should fail due to unique username");
    }

    #[tokio::test]
    async fn test_group_slug_unique_constraint() {
        let db = setup_test_db().await;
        create_test_group(&db, "Змея", "anaconda").await;

        let duplicate = GroupActiveModel {
            id: Set(GroupId::new()),
            title: Set("Other".to_string()),
            slug: Set("anaconda".to_string()),
            description: Set(String::new()),
        };

        let result = Group::insert(duplicate).exec(&db).await;
        assert!(result.is_err(), "Should fail due to unique slug");
    }

    #[tokio::test]
    async fn test_post_with_group_and_image() {
        let db = setup_test_db().await;
        let sarah = create_test_user(&db, "sarah").await;
        let group = create_test_group(&db, "Змея", "anaconda").await;

        let post_id = PostId::new();
        let post = PostActiveModel {
            id: Set(post_id),
            author_id: Set(sarah.id),
            group_id: Set(Some(group.id)),
            text: Set("crazy".to_string()),
            image: Set(Some("posts/pic.jpg".to_string())),
            created_at: Set(Utc::now()),
        };
        Post::insert(post).exec(&db).await.unwrap();

        let (post, author) = Post::find_by_id(post_id)
            .find_also_related(User)
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(post.group_id, Some(group.id));
        assert_eq!(post.image.as_deref(), Some("posts/pic.jpg"));
        assert_eq!(author.unwrap().username, "sarah");
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let db = setup_test_db().await;

        let post = PostActiveModel {
            id: Set(PostId::new()),
            author_id: Set(UserId::new()),
            group_id: Set(None),
            text: Set("orphan".to_string()),
            image: Set(None),
            created_at: Set(Utc::now()),
        };

        let result = Post::insert(post).exec(&db).await;
        assert!(result.is_err(), "Should fail due to author foreign key");
    }

    #[tokio::test]
    async fn test_follow_pair_is_unique() {
        let db = setup_test_db().await;
        let sarah = create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;

        let edge = || FollowActiveModel {
            follower_id: Set(sam.id),
            author_id: Set(sarah.id),
            created_at: Set(Utc::now()),
        };
        Follow::insert(edge()).exec(&db).await.unwrap();

        let result = Follow::insert(edge()).exec(&db).await;
        assert!(result.is_err(), "Should fail due to composite primary key");
    }

    #[tokio::test]
    async fn test_self_follow_check_constraint() {
        let db = setup_test_db().await;
        let sarah = create_test_user(&db, "sarah").await;

        let edge = FollowActiveModel {
            follower_id: Set(sarah.id),
            author_id: Set(sarah.id),
            created_at: Set(Utc::now()),
        };

        let result = Follow::insert(edge).exec(&db).await;
        assert!(result.is_err(), "Store should refuse a self-follow edge");
    }

    #[tokio::test]
    async fn test_cascade_delete_user() {
        let db = setup_test_db().await;
        let sarah = create_test_user(&db, "sarah").await;
        let sam = create_test_user(&db, "sam").await;
        let post = create_test_post(&db, &sarah, None, "crazy", 0).await;

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            post_id: Set(post.id),
            author_id: Set(sam.id),
            text: Set("nice".to_string()),
            created_at: Set(Utc::now()),
        };
        Comment::insert(comment).exec(&db).await.unwrap();

        let edge = FollowActiveModel {
            follower_id: Set(sam.id),
            author_id: Set(sarah.id),
            created_at: Set(Utc::now()),
        };
        Follow::insert(edge).exec(&db).await.unwrap();

        User::delete_by_id(sarah.id).exec(&db).await.unwrap();

        assert_eq!(Post::find().count(&db).await.unwrap(), 0, "Posts should be cascade deleted");
        assert_eq!(Comment::find().count(&db).await.unwrap(), 0, "Comments should follow their post");
        assert_eq!(Follow::find().count(&db).await.unwrap(), 0, "Edges should be cascade deleted");
    }

    #[tokio::test]
    async fn test_deleting_group_keeps_posts() {
        let db = setup_test_db().await;
        let sarah = create_test_user(&db, "sarah").await;
        let group = create_test_group(&db, "Змея", "anaconda").await;
        let post = create_test_post(&db, &sarah, Some(&group), "crazy", 0).await;

        Group::delete_by_id(group.id).exec(&db).await.unwrap();

        let post = Post::find_by_id(post.id).one(&db).await.unwrap().unwrap();
        assert_eq!(post.group_id, None, "Group link should be nulled");
    }
}
